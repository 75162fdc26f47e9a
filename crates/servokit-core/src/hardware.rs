//! Hardware interface configuration.
//!
//! A [`HardwareInterface`] pairs a [`PwmDriver`] with the facts the
//! controller needs about it: a unique identity, the size of its channel bank
//! and whether writes should be deferred to the caller's next drain.

use serde::{Deserialize, Serialize};

use crate::driver::PwmDriver;
use crate::error::{ServoError, ServoResult};

/// Largest channel bank a controller accepts.
pub const MAX_CHANNELS: usize = 4096;

/// How driver calls are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Call the driver inline.
    Immediate,
    /// Queue the call until the owner drains the controller.
    Deferred,
}

/// Serializable description of one PWM bus.
///
/// # Examples
///
/// ```
/// use servokit_core::HardwareConfig;
///
/// let config: HardwareConfig = serde_json::from_str(
///     r#"{"unique_hardware_name": "pca9685@0x40", "channel_count": 16, "async_write": true}"#,
/// )?;
/// assert!(config.validate().is_ok());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Registry key; must be unique among live controllers.
    pub unique_hardware_name: String,
    /// Number of channels on the bus.
    pub channel_count: usize,
    /// Defer driver calls to [`ServoController::run_pending`](crate::ServoController::run_pending).
    #[serde(default)]
    pub async_write: bool,
}

impl HardwareConfig {
    /// Create a configuration with immediate writes.
    #[must_use]
    pub fn new(unique_hardware_name: impl Into<String>, channel_count: usize) -> Self {
        Self {
            unique_hardware_name: unique_hardware_name.into(),
            channel_count,
            async_write: false,
        }
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder(unique_hardware_name: impl Into<String>) -> HardwareConfigBuilder {
        HardwareConfigBuilder {
            config: Self::new(unique_hardware_name, 0),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServoError::InvalidConfiguration`] for a blank name or a
    /// channel count above [`MAX_CHANNELS`].
    pub fn validate(&self) -> ServoResult<()> {
        if self.unique_hardware_name.trim().is_empty() {
            return Err(ServoError::invalid_configuration(
                "unique_hardware_name must not be empty",
            ));
        }
        if self.channel_count > MAX_CHANNELS {
            return Err(ServoError::invalid_configuration(format!(
                "channel_count must not exceed {MAX_CHANNELS}, got {}",
                self.channel_count
            )));
        }
        Ok(())
    }

    /// Scheduling policy implied by `async_write`.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        if self.async_write {
            WriteMode::Deferred
        } else {
            WriteMode::Immediate
        }
    }
}

/// Builder for [`HardwareConfig`].
#[derive(Debug, Clone)]
pub struct HardwareConfigBuilder {
    config: HardwareConfig,
}

impl HardwareConfigBuilder {
    /// Set the number of channels.
    #[must_use]
    pub fn channel_count(mut self, count: usize) -> Self {
        self.config.channel_count = count;
        self
    }

    /// Defer driver calls until drained.
    #[must_use]
    pub fn async_write(mut self, enabled: bool) -> Self {
        self.config.async_write = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> ServoResult<HardwareConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// A driver together with its validated configuration.
pub struct HardwareInterface {
    driver: Box<dyn PwmDriver>,
    config: HardwareConfig,
}

impl HardwareInterface {
    /// Pair `driver` with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`HardwareConfig::validate`].
    pub fn new(driver: impl PwmDriver + 'static, config: HardwareConfig) -> ServoResult<Self> {
        Self::from_boxed(Box::new(driver), config)
    }

    /// Pair an already boxed driver with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`HardwareConfig::validate`].
    pub fn from_boxed(driver: Box<dyn PwmDriver>, config: HardwareConfig) -> ServoResult<Self> {
        config.validate()?;
        Ok(Self { driver, config })
    }

    /// Hardware identity.
    #[must_use]
    pub fn unique_hardware_name(&self) -> &str {
        &self.config.unique_hardware_name
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.config.channel_count
    }

    /// Scheduling policy.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.config.write_mode()
    }

    /// Configuration this interface was built from.
    #[must_use]
    pub fn config(&self) -> &HardwareConfig {
        &self.config
    }

    pub(crate) fn into_parts(self) -> (Box<dyn PwmDriver>, HardwareConfig) {
        (self.driver, self.config)
    }
}

impl core::fmt::Debug for HardwareInterface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HardwareInterface")
            .field("config", &self.config)
            .field("capabilities", &self.driver.capabilities())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::RecordingDriver;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_builder() -> TestResult {
        let config = HardwareConfig::builder("pca9685@0x40")
            .channel_count(16)
            .async_write(true)
            .build()?;
        assert_eq!(config.channel_count, 16);
        assert_eq!(config.write_mode(), WriteMode::Deferred);
        Ok(())
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(HardwareConfig::new("", 4).validate().is_err());
        assert!(HardwareConfig::new("   ", 4).validate().is_err());
    }

    #[test]
    fn test_channel_count_limit() {
        assert!(HardwareConfig::new("bus", MAX_CHANNELS).validate().is_ok());
        assert!(HardwareConfig::new("bus", MAX_CHANNELS + 1).validate().is_err());
    }

    #[test]
    fn test_zero_channels_allowed() {
        assert!(HardwareConfig::new("bus", 0).validate().is_ok());
    }

    #[test]
    fn test_interface_rejects_invalid_config() {
        let result = HardwareInterface::new(RecordingDriver::new(), HardwareConfig::new("", 1));
        assert!(result.is_err());
    }

    #[test]
    fn test_interface_accessors() -> TestResult {
        let hw = HardwareInterface::new(RecordingDriver::new(), HardwareConfig::new("gpio", 8))?;
        assert_eq!(hw.unique_hardware_name(), "gpio");
        assert_eq!(hw.channel_count(), 8);
        assert_eq!(hw.write_mode(), WriteMode::Immediate);
        assert!(format!("{hw:?}").contains("gpio"));
        Ok(())
    }

    #[test]
    fn test_async_write_defaults_to_false() -> TestResult {
        let config: HardwareConfig =
            serde_json::from_str(r#"{"unique_hardware_name": "bus", "channel_count": 2}"#)?;
        assert!(!config.async_write);
        Ok(())
    }
}
