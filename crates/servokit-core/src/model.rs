//! Calibration data for a servo type.
//!
//! A [`ServoModel`] describes every unit of one servo product: which pulse
//! widths it accepts, how far it can travel, how fast it moves and which way
//! it turns as the pulse width grows. Installations share one model through
//! an `Arc` and never mutate it.

use serde::{Deserialize, Serialize};

use crate::error::{ServoError, ServoResult};
use crate::range::Range;

/// Rotational polarity of a servo model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServoDirection {
    /// Increasing pulse width turns the horn clockwise.
    #[default]
    HigherPwmClockwise,
    /// Increasing pulse width turns the horn counter-clockwise.
    LowerPwmClockwise,
}

impl ServoDirection {
    /// Whether this polarity inverts the angle sign relative to
    /// [`ServoDirection::HigherPwmClockwise`].
    #[must_use]
    pub const fn is_inverted(self) -> bool {
        matches!(self, Self::LowerPwmClockwise)
    }
}

impl core::fmt::Display for ServoDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HigherPwmClockwise => write!(f, "higher pwm clockwise"),
            Self::LowerPwmClockwise => write!(f, "lower pwm clockwise"),
        }
    }
}

/// Static calibration data for a servo type.
///
/// # Examples
///
/// ```
/// use servokit_core::{Range, ServoDirection, ServoModel};
///
/// let model = ServoModel::builder()
///     .pwm_range(Range::new(500.0, 1000.0, 1500.0)?)
///     .angle_range(Range::new(-50.0, 0.0, 50.0)?)
///     .speed(0.1)
///     .direction(ServoDirection::HigherPwmClockwise)
///     .build()?;
///
/// assert_eq!(model.pwm_range().natural(), 1000.0);
/// # Ok::<(), servokit_core::ServoError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawServoModel")]
pub struct ServoModel {
    pwm_range: Range,
    angle_range: Range,
    speed: f64,
    direction: ServoDirection,
}

#[derive(Deserialize)]
struct RawServoModel {
    pwm_range: Range,
    angle_range: Range,
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    direction: ServoDirection,
}

impl TryFrom<RawServoModel> for ServoModel {
    type Error = ServoError;

    fn try_from(raw: RawServoModel) -> ServoResult<Self> {
        Self::new(raw.pwm_range, raw.angle_range, raw.speed, raw.direction)
    }
}

impl ServoModel {
    /// Create a model from its calibration data.
    ///
    /// # Arguments
    ///
    /// * `pwm_range` - Pulse widths for full deflection either way and at rest.
    /// * `angle_range` - Mechanical travel in degrees; both ends must be non-zero.
    /// * `speed` - Nominal seconds per 60 degrees of travel.
    /// * `direction` - Rotation sense for increasing pulse width.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] if either end of the angle
    /// range is zero (the interpolation would divide by it), if the pulse-width
    /// range does not fit the driver's `i32` pulse widths, or if `speed` is
    /// negative or not finite.
    pub fn new(
        pwm_range: Range,
        angle_range: Range,
        speed: f64,
        direction: ServoDirection,
    ) -> ServoResult<Self> {
        if angle_range.min() == 0.0 || angle_range.max() == 0.0 {
            return Err(ServoError::invalid_configuration(format!(
                "angle range endpoints must be non-zero (min: {}, max: {})",
                angle_range.min(),
                angle_range.max()
            )));
        }
        if pwm_range.min() < f64::from(i32::MIN) || pwm_range.max() > f64::from(i32::MAX) {
            return Err(ServoError::invalid_configuration(format!(
                "pwm range must lie within [{}, {}] (min: {}, max: {})",
                i32::MIN,
                i32::MAX,
                pwm_range.min(),
                pwm_range.max()
            )));
        }
        if !speed.is_finite() || speed < 0.0 {
            return Err(ServoError::invalid_configuration(format!(
                "speed must be a finite, non-negative number, got {speed}"
            )));
        }
        Ok(Self {
            pwm_range,
            angle_range,
            speed,
            direction,
        })
    }

    /// Unchecked constructor for the built-in calibration tables.
    pub(crate) const fn from_parts(
        pwm_range: Range,
        angle_range: Range,
        speed: f64,
        direction: ServoDirection,
    ) -> Self {
        Self {
            pwm_range,
            angle_range,
            speed,
            direction,
        }
    }

    /// Create a model builder.
    #[must_use]
    pub fn builder() -> ServoModelBuilder {
        ServoModelBuilder::default()
    }

    /// Pulse-width calibration.
    #[must_use]
    pub const fn pwm_range(&self) -> &Range {
        &self.pwm_range
    }

    /// Angular travel in degrees.
    #[must_use]
    pub const fn angle_range(&self) -> &Range {
        &self.angle_range
    }

    /// Nominal speed in seconds per 60 degrees.
    #[must_use]
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Rotational polarity.
    #[must_use]
    pub const fn direction(&self) -> ServoDirection {
        self.direction
    }
}

/// Builder for [`ServoModel`].
///
/// Both ranges are required; `speed` defaults to `0.0` and `direction` to
/// [`ServoDirection::HigherPwmClockwise`].
#[derive(Debug, Default, Clone)]
pub struct ServoModelBuilder {
    pwm_range: Option<Range>,
    angle_range: Option<Range>,
    speed: f64,
    direction: ServoDirection,
}

impl ServoModelBuilder {
    /// Set the pulse-width range.
    #[must_use]
    pub fn pwm_range(mut self, range: Range) -> Self {
        self.pwm_range = Some(range);
        self
    }

    /// Set the angle range.
    #[must_use]
    pub fn angle_range(mut self, range: Range) -> Self {
        self.angle_range = Some(range);
        self
    }

    /// Set the nominal speed.
    #[must_use]
    pub fn speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Set the rotational polarity.
    #[must_use]
    pub fn direction(mut self, direction: ServoDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Build the model.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] if a range is missing or
    /// the data is rejected by [`ServoModel::new`].
    pub fn build(self) -> ServoResult<ServoModel> {
        let pwm_range = self.pwm_range.ok_or_else(|| {
            ServoError::invalid_configuration("servo model needs a pwm range (pwm_range)")
        })?;
        let angle_range = self.angle_range.ok_or_else(|| {
            ServoError::invalid_configuration("servo model needs an angle range (angle_range)")
        })?;
        ServoModel::new(pwm_range, angle_range, self.speed, self.direction)
    }
}
