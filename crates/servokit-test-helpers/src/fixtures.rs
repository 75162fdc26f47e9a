//! Canonical servo models and controller rigs.

use std::sync::Arc;

use servokit_core::driver::mock::{DriverProbe, RecordingDriver};
use servokit_core::prelude::*;

use crate::must::must;

/// Pulse widths 500..1000..1500 over -50..0..50 degrees: `pwm(a) = 1000 + 10a`.
#[must_use]
pub fn canonical_model() -> ServoModel {
    canonical_model_with(ServoDirection::HigherPwmClockwise)
}

/// [`canonical_model`] with the given polarity.
#[must_use]
pub fn canonical_model_with(direction: ServoDirection) -> ServoModel {
    must(
        ServoModel::builder()
            .pwm_range(must(Range::new(500.0, 1000.0, 1500.0)))
            .angle_range(must(Range::new(-50.0, 0.0, 50.0)))
            .speed(0.1)
            .direction(direction)
            .build(),
    )
}

/// A registry with one controller on a recording driver.
#[derive(Debug)]
pub struct Rig {
    /// Registry the controller lives in.
    pub registry: ControllerRegistry,
    /// The controller.
    pub controller: Arc<ServoController>,
    /// Calls the controller made on its driver.
    pub probe: DriverProbe,
}

/// How to set up a [`Rig`].
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Hardware identity.
    pub name: String,
    /// Channels on the bank.
    pub channel_count: usize,
    /// Defer driver calls until drained.
    pub async_write: bool,
    /// Whether the driver supports enable/disable.
    pub enable_disable: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            name: "TEST1".to_string(),
            channel_count: 16,
            async_write: false,
            enable_disable: true,
        }
    }
}

impl Rig {
    /// Immediate writes, enable/disable supported.
    #[must_use]
    pub fn immediate() -> Self {
        Self::with_config(RigConfig::default())
    }

    /// Deferred writes, enable/disable supported.
    #[must_use]
    pub fn deferred() -> Self {
        Self::with_config(RigConfig {
            async_write: true,
            ..RigConfig::default()
        })
    }

    /// Immediate writes on a driver that can only write.
    #[must_use]
    pub fn write_only() -> Self {
        Self::with_config(RigConfig {
            enable_disable: false,
            ..RigConfig::default()
        })
    }

    /// Build a rig from `config`.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is rejected.
    #[must_use]
    pub fn with_config(config: RigConfig) -> Self {
        let driver = if config.enable_disable {
            RecordingDriver::with_enable_disable()
        } else {
            RecordingDriver::new()
        };
        let probe = driver.probe();
        let registry = ControllerRegistry::new();
        let hardware = must(HardwareInterface::new(
            driver,
            must(
                HardwareConfig::builder(config.name)
                    .channel_count(config.channel_count)
                    .async_write(config.async_write)
                    .build(),
            ),
        ));
        let controller = must(registry.create(hardware));
        Self {
            registry,
            controller,
            probe,
        }
    }

    /// A canonical servo on `channel` with no trim.
    ///
    /// # Panics
    ///
    /// Panics if the channel is not on the bank.
    #[must_use]
    pub fn canonical_servo(&self, channel: usize) -> Servo {
        self.servo(canonical_model(), channel, ServoTrim::default())
    }

    /// A servo of `model` on `channel` with `trim`.
    ///
    /// # Panics
    ///
    /// Panics if the servo is rejected.
    #[must_use]
    pub fn servo(&self, model: ServoModel, channel: usize, trim: ServoTrim) -> Servo {
        must(
            Servo::builder(model, Arc::clone(&self.controller))
                .channel(channel)
                .trim(trim)
                .build(),
        )
    }
}
