//! One physical servo bound to a controller channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::controller::ServoController;
use crate::error::{ServoError, ServoResult};
use crate::model::ServoModel;
use crate::range::AngleClamp;

/// Installation-specific corrections for one unit.
///
/// These adjust a single physical servo without touching the shared
/// [`ServoModel`]: a mechanical center trim, a polarity flip for servos
/// mounted mirrored, and an optional angle clamp tighter than the model's
/// travel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoTrim {
    /// Fixed pulse-width offset added after interpolation.
    pub center_offset_pwm: f64,
    /// Invert the model's polarity for this unit.
    pub flip_direction: bool,
    /// Per-unit angle limits.
    pub angle_clamp: Option<AngleClamp>,
}

impl ServoTrim {
    /// Validate the trim.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] for a non-finite offset or
    /// an invalid angle clamp.
    pub fn validate(&self) -> ServoResult<()> {
        if !self.center_offset_pwm.is_finite() {
            return Err(ServoError::invalid_configuration(format!(
                "center_offset_pwm must be finite, got {}",
                self.center_offset_pwm
            )));
        }
        if let Some(clamp) = &self.angle_clamp {
            clamp.validate()?;
        }
        Ok(())
    }
}

/// A servo unit: a model, a channel on a controller and the unit's trim.
///
/// Servos are immutable. The per-channel runtime state (last pulse width,
/// disabled flag) lives in the controller, which serves every servo on its
/// channel bank.
///
/// # Examples
///
/// ```
/// use servokit_core::prelude::*;
/// use servokit_core::driver::mock::RecordingDriver;
///
/// let registry = ControllerRegistry::new();
/// let controller = registry.create(HardwareInterface::new(
///     RecordingDriver::new(),
///     HardwareConfig::new("pca9685@0x40", 16),
/// )?)?;
///
/// let pan = Servo::builder(defaults::TOWERPRO_MG92B, controller)
///     .channel(3)
///     .center_offset_pwm(-12.0)
///     .build()?;
///
/// pan.set_angle_degrees(30.0);
/// assert!(pan.controller().last_pulse_width(3).is_some());
/// # Ok::<(), servokit_core::ServoError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Servo {
    model: Arc<ServoModel>,
    controller: Arc<ServoController>,
    channel: usize,
    trim: ServoTrim,
}

impl Servo {
    /// Start building a servo of `model` driven by `controller`.
    #[must_use]
    pub fn builder(
        model: impl Into<Arc<ServoModel>>,
        controller: Arc<ServoController>,
    ) -> ServoBuilder {
        ServoBuilder {
            model: model.into(),
            controller,
            channel: 0,
            trim: ServoTrim::default(),
        }
    }

    /// Calibration data.
    #[must_use]
    pub fn model(&self) -> &ServoModel {
        &self.model
    }

    /// Controller driving this servo.
    #[must_use]
    pub fn controller(&self) -> &Arc<ServoController> {
        &self.controller
    }

    /// Hardware channel.
    #[must_use]
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Installation trim.
    #[must_use]
    pub fn trim(&self) -> &ServoTrim {
        &self.trim
    }

    /// Center trim in pulse-width units.
    #[must_use]
    pub fn center_offset_pwm(&self) -> f64 {
        self.trim.center_offset_pwm
    }

    /// Whether the unit's polarity is flipped.
    #[must_use]
    pub fn flip_direction(&self) -> bool {
        self.trim.flip_direction
    }

    /// Per-unit angle limits.
    #[must_use]
    pub fn angle_clamp(&self) -> Option<AngleClamp> {
        self.trim.angle_clamp
    }

    /// Command an angle in degrees.
    pub fn set_angle_degrees(&self, angle: f64) {
        self.controller.set_angle_degrees(self, angle);
    }

    /// Command an angle in degrees and log how the pulse width was derived.
    pub fn set_angle_degrees_traced(&self, angle: f64) {
        self.controller.set_angle_degrees_traced(self, angle);
    }

    /// Command an angle in radians.
    pub fn set_angle_radians(&self, angle: f64) {
        self.controller.set_angle_radians(self, angle);
    }

    /// Command an angle in radians and log how the pulse width was derived.
    pub fn set_angle_radians_traced(&self, angle: f64) {
        self.controller.set_angle_radians_traced(self, angle);
    }

    /// Resume driving this servo.
    pub fn enable(&self) {
        self.controller.enable_servo(self);
    }

    /// Stop driving this servo.
    pub fn disable(&self) {
        self.controller.disable_servo(self);
    }

    /// Whether the controller has this servo's channel disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.controller.is_disabled(self)
    }
}

/// Builder for [`Servo`].
#[derive(Debug, Clone)]
pub struct ServoBuilder {
    model: Arc<ServoModel>,
    controller: Arc<ServoController>,
    channel: usize,
    trim: ServoTrim,
}

impl ServoBuilder {
    /// Set the hardware channel.
    #[must_use]
    pub fn channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    /// Set the center trim.
    #[must_use]
    pub fn center_offset_pwm(mut self, offset: f64) -> Self {
        self.trim.center_offset_pwm = offset;
        self
    }

    /// Flip the unit's polarity.
    #[must_use]
    pub fn flip_direction(mut self, flip: bool) -> Self {
        self.trim.flip_direction = flip;
        self
    }

    /// Limit the commandable angle.
    #[must_use]
    pub fn angle_clamp(mut self, clamp: AngleClamp) -> Self {
        self.trim.angle_clamp = Some(clamp);
        self
    }

    /// Replace the whole trim, e.g. one loaded from configuration.
    #[must_use]
    pub fn trim(mut self, trim: ServoTrim) -> Self {
        self.trim = trim;
        self
    }

    /// Build the servo.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::ChannelOutOfRange`] if the controller has no such
    /// channel, or [`ServoError::InvalidConfiguration`] for an invalid trim.
    pub fn build(self) -> ServoResult<Servo> {
        let channel_count = self.controller.channel_count();
        if self.channel >= channel_count {
            return Err(ServoError::channel_out_of_range(
                self.controller.unique_hardware_name(),
                self.channel,
                channel_count,
            ));
        }
        self.trim.validate()?;
        Ok(Servo {
            model: self.model,
            controller: self.controller,
            channel: self.channel,
            trim: self.trim,
        })
    }
}
