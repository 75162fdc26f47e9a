//! Error types for servo configuration and controller management.
//!
//! Runtime commands (set angle, enable, disable) never fail: they are either
//! applied, normalized or skipped with a diagnostic. Every variant here is
//! raised while building configuration or wiring controllers together.

/// Errors raised while constructing servo configuration or controllers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServoError {
    /// Calibration or configuration data is missing or inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A live controller already owns this hardware identity.
    #[error(
        "A servo controller already exists for hardware '{0}'; look it up with get() instead of initializing the hardware twice"
    )]
    DuplicateHardware(String),

    /// A servo was bound to a channel its controller does not have.
    #[error("Channel {channel} is out of range for hardware '{hardware}' ({channel_count} channels)")]
    ChannelOutOfRange {
        /// Hardware identity of the controller
        hardware: String,
        /// Requested channel
        channel: usize,
        /// Number of channels on the hardware
        channel_count: usize,
    },
}

impl ServoError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a duplicate hardware error.
    #[must_use]
    pub fn duplicate_hardware(name: impl Into<String>) -> Self {
        Self::DuplicateHardware(name.into())
    }

    /// Create a channel out of range error.
    #[must_use]
    pub fn channel_out_of_range(
        hardware: impl Into<String>,
        channel: usize,
        channel_count: usize,
    ) -> Self {
        Self::ChannelOutOfRange {
            hardware: hardware.into(),
            channel,
            channel_count,
        }
    }

    /// Whether the error comes from rejected configuration data rather than
    /// from controller bookkeeping.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_) | Self::ChannelOutOfRange { .. }
        )
    }
}

/// A specialized `Result` type for servo configuration.
pub type ServoResult<T> = Result<T, ServoError>;
