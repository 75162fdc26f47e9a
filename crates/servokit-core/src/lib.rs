//! # servokit-core
//!
//! Angle to pulse-width conversion and per-hardware servo controllers.
//!
//! This crate turns logical servo commands (an angle in degrees or radians)
//! into the pulse widths a PWM driver understands, and manages the runtime
//! state of every channel on a driver:
//! - [`ServoModel`] calibration data shared by all units of a servo type
//! - [`Servo`] units with per-installation trim, polarity flip and angle clamp
//! - [`ServoController`] owning one driver, with write deduplication,
//!   enable/disable dispatch and optional deferred writes
//! - [`ControllerRegistry`] guaranteeing one live controller per hardware
//!
//! ## Conversion Guarantees
//!
//! - **Hardware-safe output**: pulse widths never leave the model's range,
//!   whatever the angle, offset or clamp
//! - **No NaN on the bus**: non-numeric angles are treated as `0`
//! - **Radians are degrees**: radian commands convert first and then take the
//!   exact degree path
//! - **Quiet buses**: an unchanged pulse width is never written twice
//!
//! ## Controller Lifecycle
//!
//! ```text
//! ┌────────┐  create()   ┌──────┐
//! │ absent │────────────►│ live │──── create() ──► DuplicateHardware
//! └────────┘             └──────┘
//!      ▲                     │
//!      └───── dispose() ─────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use servokit_core::prelude::*;
//! use servokit_core::driver::mock::RecordingDriver;
//!
//! let driver = RecordingDriver::with_enable_disable();
//! let probe = driver.probe();
//!
//! let registry = ControllerRegistry::new();
//! let controller = registry.create(HardwareInterface::new(
//!     driver,
//!     HardwareConfig::new("pca9685@0x40", 16),
//! )?)?;
//!
//! let tilt = Servo::builder(defaults::CORONA_DS339HV, controller.clone())
//!     .channel(0)
//!     .build()?;
//!
//! tilt.set_angle_degrees(37.5);
//! assert_eq!(probe.last_write(), Some((0, 1875)));
//!
//! tilt.disable();
//! tilt.set_angle_degrees(-10.0);
//! assert_eq!(probe.write_count(), 1);
//!
//! controller.dispose();
//! assert!(registry.get("pca9685@0x40").is_none());
//! # Ok::<(), servokit_core::ServoError>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod controller;
pub mod conversion;
pub mod defaults;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod hardware;
pub mod model;
pub mod prelude;
pub mod range;
pub mod registry;
pub mod servo;
pub mod trace;

pub use controller::{ControllerStats, ServoController};
pub use driver::{DriverCapabilities, PwmDriver};
pub use error::{ServoError, ServoResult};
pub use hardware::{HardwareConfig, HardwareInterface, MAX_CHANNELS, WriteMode};
pub use model::{ServoDirection, ServoModel};
pub use range::{AngleClamp, Range};
pub use registry::ControllerRegistry;
pub use servo::{Servo, ServoTrim};
pub use trace::PwmTrace;
