//! PWM driver boundary.
//!
//! The driver is the piece that actually toggles pins or talks to a PWM
//! expander. The controller only ever calls it through [`PwmDriver`].

/// Optional operations a driver supports beyond writing pulse widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverCapabilities {
    /// `enable_servo` is implemented.
    pub enable: bool,
    /// `disable_servo` is implemented.
    pub disable: bool,
}

impl DriverCapabilities {
    /// Only `write_pwm` and `dispose`.
    pub const WRITE_ONLY: Self = Self {
        enable: false,
        disable: false,
    };

    /// Full enable/disable support.
    pub const ENABLE_DISABLE: Self = Self {
        enable: true,
        disable: true,
    };
}

/// Hardware PWM driver for a bank of channels.
///
/// `write_pwm` and `dispose` are required. Enabling and disabling outputs is
/// optional: a driver that can do it reports so through
/// [`capabilities`](Self::capabilities) and overrides the matching method.
/// The controller checks the capability before dispatching, so the default
/// method bodies are never reached for an honest driver.
pub trait PwmDriver: Send {
    /// Emit `pulse_width` on `channel`.
    ///
    /// Fire-and-forget: the controller never waits for completion and has no
    /// failure path for a write.
    fn write_pwm(&mut self, channel: usize, pulse_width: i32);

    /// Optional operations this driver implements.
    fn capabilities(&self) -> DriverCapabilities {
        DriverCapabilities::WRITE_ONLY
    }

    /// Resume driving `channel`.
    fn enable_servo(&mut self, _channel: usize) {}

    /// Stop driving `channel` so the servo can relax.
    fn disable_servo(&mut self, _channel: usize) {}

    /// Release driver resources (bus handles, timers). Called exactly once.
    fn dispose(&mut self);
}

pub mod mock {
    //! Recording driver for tests and demos.

    use super::{DriverCapabilities, PwmDriver};
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// A driver call observed by [`RecordingDriver`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DriverEvent {
        /// `write_pwm(channel, pulse_width)`
        Write {
            /// Channel written
            channel: usize,
            /// Pulse width written
            pulse_width: i32,
        },
        /// `enable_servo(channel)`
        Enable(usize),
        /// `disable_servo(channel)`
        Disable(usize),
        /// `dispose()`
        Dispose,
    }

    /// Driver that records every call instead of touching hardware.
    #[derive(Debug)]
    pub struct RecordingDriver {
        capabilities: DriverCapabilities,
        events: Arc<Mutex<Vec<DriverEvent>>>,
    }

    /// Read side of a [`RecordingDriver`], still usable after the driver has
    /// been handed to a controller.
    #[derive(Debug, Clone)]
    pub struct DriverProbe {
        events: Arc<Mutex<Vec<DriverEvent>>>,
    }

    impl RecordingDriver {
        /// A driver that only writes pulse widths.
        #[must_use]
        pub fn new() -> Self {
            Self::with_capabilities(DriverCapabilities::WRITE_ONLY)
        }

        /// A driver that also supports enable/disable.
        #[must_use]
        pub fn with_enable_disable() -> Self {
            Self::with_capabilities(DriverCapabilities::ENABLE_DISABLE)
        }

        /// A driver advertising exactly `capabilities`.
        #[must_use]
        pub fn with_capabilities(capabilities: DriverCapabilities) -> Self {
            Self {
                capabilities,
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Handle for inspecting recorded calls.
        #[must_use]
        pub fn probe(&self) -> DriverProbe {
            DriverProbe {
                events: Arc::clone(&self.events),
            }
        }

        fn record(&self, event: DriverEvent) {
            self.events.lock().push(event);
        }
    }

    impl Default for RecordingDriver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PwmDriver for RecordingDriver {
        fn write_pwm(&mut self, channel: usize, pulse_width: i32) {
            self.record(DriverEvent::Write {
                channel,
                pulse_width,
            });
        }

        fn capabilities(&self) -> DriverCapabilities {
            self.capabilities
        }

        fn enable_servo(&mut self, channel: usize) {
            self.record(DriverEvent::Enable(channel));
        }

        fn disable_servo(&mut self, channel: usize) {
            self.record(DriverEvent::Disable(channel));
        }

        fn dispose(&mut self) {
            self.record(DriverEvent::Dispose);
        }
    }

    impl DriverProbe {
        /// Every recorded call, oldest first.
        #[must_use]
        pub fn events(&self) -> Vec<DriverEvent> {
            self.events.lock().clone()
        }

        /// Recorded writes as `(channel, pulse_width)` pairs.
        #[must_use]
        pub fn writes(&self) -> Vec<(usize, i32)> {
            self.events
                .lock()
                .iter()
                .filter_map(|event| match *event {
                    DriverEvent::Write {
                        channel,
                        pulse_width,
                    } => Some((channel, pulse_width)),
                    _ => None,
                })
                .collect()
        }

        /// Most recent write, if any.
        #[must_use]
        pub fn last_write(&self) -> Option<(usize, i32)> {
            self.writes().last().copied()
        }

        /// Number of recorded writes.
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes().len()
        }

        /// Number of recorded `dispose` calls.
        #[must_use]
        pub fn dispose_count(&self) -> usize {
            self.events
                .lock()
                .iter()
                .filter(|event| matches!(event, DriverEvent::Dispose))
                .count()
        }

        /// Forget everything recorded so far.
        pub fn clear(&self) {
            self.events.lock().clear();
        }
    }
}
