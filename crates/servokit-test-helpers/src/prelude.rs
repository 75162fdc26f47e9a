//! Convenience re-exports for servokit tests.

pub use crate::fixtures::{Rig, RigConfig, canonical_model, canonical_model_with};
pub use crate::must::{must, must_err, must_some};

/// Result type for tests that use `?`.
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
