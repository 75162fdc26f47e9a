//! Prelude for servokit-core.
//!
//! Re-exports the types needed to configure hardware, build servos and
//! command them.
//!
//! # Example
//!
//! ```rust
//! use servokit_core::prelude::*;
//!
//! let model = defaults::lookup("Savox_SH0256");
//! assert!(model.is_some());
//! ```

pub use crate::controller::{ControllerStats, ServoController};
pub use crate::defaults;
pub use crate::driver::{DriverCapabilities, PwmDriver};
pub use crate::error::{ServoError, ServoResult};
pub use crate::hardware::{
    HardwareConfig, HardwareConfigBuilder, HardwareInterface, MAX_CHANNELS, WriteMode,
};
pub use crate::model::{ServoDirection, ServoModel, ServoModelBuilder};
pub use crate::range::{AngleClamp, Range};
pub use crate::registry::ControllerRegistry;
pub use crate::servo::{Servo, ServoBuilder, ServoTrim};
