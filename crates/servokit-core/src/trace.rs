//! Human-readable record of one angle conversion.

use core::fmt;

/// Step-by-step account of how a pulse width was derived.
///
/// Filled in by [`conversion::angle_to_pwm`](crate::conversion::angle_to_pwm)
/// when the caller asks for it and emitted as a single diagnostic once the
/// computation is done. Recording never changes the computed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PwmTrace {
    header: String,
    steps: Vec<String>,
}

impl PwmTrace {
    /// Start a trace with a one-line summary of the command.
    #[must_use]
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            steps: Vec::new(),
        }
    }

    /// Append one step.
    pub fn record(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    /// Summary line.
    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Recorded steps, in order.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Whether no step has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for PwmTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        for step in &self.steps {
            write!(f, "\n-- {step}")?;
        }
        Ok(())
    }
}
