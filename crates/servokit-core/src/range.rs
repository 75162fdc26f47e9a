//! Value ranges shared by the angular and pulse-width domains.

use serde::{Deserialize, Serialize};

use crate::error::{ServoError, ServoResult};

/// An immutable `(min, natural, max)` triple.
///
/// Used both for pulse widths (timer ticks or microseconds) and for angles
/// (degrees). `natural` is the value at rest: the center pulse width, or zero
/// deflection.
///
/// # Examples
///
/// ```
/// use servokit_core::Range;
///
/// let pwm = Range::new(500.0, 1000.0, 1500.0).expect("ordered range");
/// assert_eq!(pwm.natural(), 1000.0);
/// assert!(Range::new(1500.0, 1000.0, 500.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    min: f64,
    natural: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawRange {
    min: f64,
    natural: f64,
    max: f64,
}

impl TryFrom<RawRange> for Range {
    type Error = ServoError;

    fn try_from(raw: RawRange) -> ServoResult<Self> {
        Self::new(raw.min, raw.natural, raw.max)
    }
}

impl Range {
    /// Create a range, checking `min <= natural <= max` and finiteness.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] if a component is not
    /// finite or the components are out of order.
    pub fn new(min: f64, natural: f64, max: f64) -> ServoResult<Self> {
        if !(min.is_finite() && natural.is_finite() && max.is_finite()) {
            return Err(ServoError::invalid_configuration(format!(
                "range components must be finite (min: {min}, natural: {natural}, max: {max})"
            )));
        }
        if min > natural || natural > max {
            return Err(ServoError::invalid_configuration(format!(
                "range must satisfy min <= natural <= max (min: {min}, natural: {natural}, max: {max})"
            )));
        }
        Ok(Self { min, natural, max })
    }

    /// Unchecked constructor for the built-in calibration tables.
    pub(crate) const fn from_parts(min: f64, natural: f64, max: f64) -> Self {
        Self { min, natural, max }
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Rest value.
    #[must_use]
    pub const fn natural(&self) -> f64 {
        self.natural
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Clamp `value` to `[min, max]`.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Per-installation angle limits, tighter than the model's mechanical range.
///
/// Each bound is optional and constrains only its own side. A bound of `0.0`
/// is a real bound.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AngleClamp {
    /// Lowest commandable angle in degrees.
    pub min: Option<f64>,
    /// Highest commandable angle in degrees.
    pub max: Option<f64>,
}

impl AngleClamp {
    /// Clamp on both sides.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Clamp only from below.
    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Clamp only from above.
    #[must_use]
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Apply both bounds to `angle`.
    #[must_use]
    pub fn apply(&self, angle: f64) -> f64 {
        let mut angle = angle;
        if let Some(min) = self.min {
            angle = angle.max(min);
        }
        if let Some(max) = self.max {
            angle = angle.min(max);
        }
        angle
    }

    /// Check the bounds are finite and ordered.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] for a non-finite bound or
    /// for `min > max`.
    pub fn validate(&self) -> ServoResult<()> {
        for bound in [self.min, self.max].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(ServoError::invalid_configuration(format!(
                    "angle clamp bounds must be finite, got {bound}"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            return Err(ServoError::invalid_configuration(format!(
                "angle clamp min ({min}) exceeds max ({max})"
            )));
        }
        Ok(())
    }
}

impl From<Range> for AngleClamp {
    fn from(range: Range) -> Self {
        Self::new(range.min(), range.max())
    }
}
