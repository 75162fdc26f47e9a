//! Per-hardware servo controller.
//!
//! A [`ServoController`] owns one hardware interface and the runtime state of
//! its channel bank: the last pulse width written on each channel and whether
//! the channel is disabled. It turns angle commands into pulse widths,
//! suppresses writes that would not change the output and dispatches
//! enable/disable requests the driver supports.
//!
//! # Write path
//!
//! ```text
//! set_angle_degrees ─► disabled? ─► convert ─► round ─► same as last? ─► driver
//!                         │ yes                            │ yes
//!                         ▼                                ▼
//!                       skip                           suppress
//! ```
//!
//! In [`WriteMode::Deferred`] the final driver call is queued instead and runs
//! on the next [`ServoController::run_pending`]. The deduplication state is
//! updated when the write is queued, so both modes end in the same state.

use std::sync::Weak;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::conversion::{self, radians_to_degrees, round_pulse_width};
use crate::dispatch::{PendingCommand, PendingQueue};
use crate::driver::{DriverCapabilities, PwmDriver};
use crate::hardware::{HardwareInterface, WriteMode};
use crate::registry::{self, ControllerTable};
use crate::servo::Servo;
use crate::trace::PwmTrace;

/// Counters describing what a controller has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ControllerStats {
    /// Pulse widths handed to the driver.
    pub writes_issued: u64,
    /// Writes skipped because the channel already had that pulse width.
    pub writes_suppressed: u64,
    /// Commands dropped because the controller was disposed or the channel
    /// does not exist.
    pub commands_ignored: u64,
    /// Enable/disable requests the driver could not perform.
    pub capability_misses: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    last_written: Option<i32>,
    disabled: bool,
}

struct ControllerState {
    driver: Box<dyn PwmDriver>,
    channels: Vec<ChannelState>,
    pending: PendingQueue,
    stats: ControllerStats,
    missing_capabilities_reported: DriverCapabilities,
    disposed: bool,
}

impl ControllerState {
    fn execute(&mut self, command: PendingCommand) {
        match command {
            PendingCommand::Write {
                channel,
                pulse_width,
            } => {
                self.driver.write_pwm(channel, pulse_width);
                self.stats.writes_issued = self.stats.writes_issued.saturating_add(1);
            }
            PendingCommand::Enable(channel) => {
                self.driver.enable_servo(channel);
                if let Some(state) = self.channels.get_mut(channel) {
                    state.disabled = false;
                }
            }
            PendingCommand::Disable(channel) => {
                self.driver.disable_servo(channel);
                if let Some(state) = self.channels.get_mut(channel) {
                    state.disabled = true;
                }
            }
        }
    }
}

/// Controller for one hardware interface.
///
/// Created through [`ControllerRegistry::create`](crate::ControllerRegistry::create).
/// All methods take `&self`; the channel state sits behind a mutex so servos
/// on different threads can share one controller.
pub struct ServoController {
    name: String,
    channel_count: usize,
    write_mode: WriteMode,
    capabilities: DriverCapabilities,
    registry: Weak<ControllerTable>,
    state: Mutex<ControllerState>,
}

impl ServoController {
    pub(crate) fn new(hardware: HardwareInterface, registry: Weak<ControllerTable>) -> Self {
        let (driver, config) = hardware.into_parts();
        let write_mode = config.write_mode();
        let capabilities = driver.capabilities();
        debug!(
            "Creating servo controller for hardware '{}' ({} channels, {:?} writes)",
            config.unique_hardware_name, config.channel_count, write_mode
        );
        Self {
            channel_count: config.channel_count,
            name: config.unique_hardware_name,
            write_mode,
            capabilities,
            registry,
            state: Mutex::new(ControllerState {
                driver,
                channels: vec![ChannelState::default(); config.channel_count],
                pending: PendingQueue::new(),
                stats: ControllerStats::default(),
                missing_capabilities_reported: DriverCapabilities::default(),
                disposed: false,
            }),
        }
    }

    /// Hardware identity.
    #[must_use]
    pub fn unique_hardware_name(&self) -> &str {
        &self.name
    }

    /// Number of channels in the bank.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Whether driver calls run inline or on the next drain.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    /// Optional operations the driver supports.
    #[must_use]
    pub fn capabilities(&self) -> DriverCapabilities {
        self.capabilities
    }

    /// Command `servo` to `angle` degrees.
    ///
    /// Does nothing while the servo's channel is disabled. A non-numeric
    /// angle is treated as `0`.
    pub fn set_angle_degrees(&self, servo: &Servo, angle: f64) {
        self.command_angle(servo, angle, false);
    }

    /// Like [`set_angle_degrees`](Self::set_angle_degrees), and log every
    /// conversion step as one debug event.
    pub fn set_angle_degrees_traced(&self, servo: &Servo, angle: f64) {
        self.command_angle(servo, angle, true);
    }

    /// Command `servo` to `angle` radians.
    pub fn set_angle_radians(&self, servo: &Servo, angle: f64) {
        self.command_angle(servo, radians_to_degrees(angle), false);
    }

    /// Like [`set_angle_radians`](Self::set_angle_radians), with a trace.
    pub fn set_angle_radians_traced(&self, servo: &Servo, angle: f64) {
        self.command_angle(servo, radians_to_degrees(angle), true);
    }

    /// Resume driving `servo`'s channel.
    ///
    /// Needs [`DriverCapabilities::enable`]; without it nothing changes; the first
    /// such call per controller logs a warning, later ones log at debug level.
    pub fn enable_servo(&self, servo: &Servo) {
        self.toggle(servo.channel(), true);
    }

    /// Stop driving `servo`'s channel. Angle commands are ignored until the
    /// channel is enabled again.
    ///
    /// Needs [`DriverCapabilities::disable`]; without it nothing changes; the first
    /// such call per controller logs a warning, later ones log at debug level.
    pub fn disable_servo(&self, servo: &Servo) {
        self.toggle(servo.channel(), false);
    }

    /// Whether `servo`'s channel is disabled.
    #[must_use]
    pub fn is_disabled(&self, servo: &Servo) -> bool {
        self.state
            .lock()
            .channels
            .get(servo.channel())
            .is_some_and(|channel| channel.disabled)
    }

    /// Last pulse width recorded for `channel`, if anything was written.
    #[must_use]
    pub fn last_pulse_width(&self, channel: usize) -> Option<i32> {
        self.state
            .lock()
            .channels
            .get(channel)
            .and_then(|channel| channel.last_written)
    }

    /// Execute every queued driver command in scheduling order.
    ///
    /// Returns the number of commands executed. Always `0` in
    /// [`WriteMode::Immediate`].
    pub fn run_pending(&self) -> usize {
        let mut state = self.state.lock();
        let commands = state.pending.take_all();
        let count = commands.len();
        for command in commands {
            state.execute(command);
        }
        if count > 0 {
            debug!(
                "Ran {count} pending command(s) on hardware '{}'",
                self.name
            );
        }
        count
    }

    /// Number of commands waiting for [`run_pending`](Self::run_pending).
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Snapshot of the controller's counters.
    #[must_use]
    pub fn stats(&self) -> ControllerStats {
        self.state.lock().stats
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Release the hardware and leave the registry.
    ///
    /// Queued commands are discarded and the driver's `dispose` runs exactly
    /// once. Afterwards a new controller may be created for the same hardware
    /// identity. Calling this again does nothing.
    pub fn dispose(&self) {
        {
            let mut state = self.state.lock();
            if state.disposed {
                debug!("Servo controller for hardware '{}' already disposed", self.name);
                return;
            }
            state.disposed = true;
            let dropped = state.pending.discard();
            if dropped > 0 {
                debug!(
                    "Discarded {dropped} pending command(s) for hardware '{}'",
                    self.name
                );
            }
            state.driver.dispose();
        }
        registry::release(&self.registry, self);
        debug!("Disposed servo controller for hardware '{}'", self.name);
    }

    fn command_angle(&self, servo: &Servo, angle: f64, traced: bool) {
        let channel = servo.channel();
        let mut state = self.state.lock();
        if !self.accepts(&mut state, channel, "set angle") {
            return;
        }
        if state.channels.get(channel).is_some_and(|c| c.disabled) {
            if traced {
                debug!(
                    "Servo on hardware '{}' channel {channel} is disabled, cannot set angle",
                    self.name
                );
            }
            return;
        }

        let pulse_width = if traced {
            let mut trace = PwmTrace::new(format!(
                "set angle {angle}deg on hardware '{}' channel {channel}",
                self.name
            ));
            let pwm = conversion::angle_to_pwm(servo.model(), servo.trim(), angle, Some(&mut trace));
            debug!("{trace}");
            round_pulse_width(pwm)
        } else {
            conversion::pulse_width_for_degrees(servo.model(), servo.trim(), angle)
        };

        self.write(&mut state, channel, pulse_width);
    }

    fn write(&self, state: &mut ControllerState, channel: usize, pulse_width: i32) {
        let Some(slot) = state.channels.get_mut(channel) else {
            return;
        };
        if slot.last_written == Some(pulse_width) {
            state.stats.writes_suppressed = state.stats.writes_suppressed.saturating_add(1);
            return;
        }
        slot.last_written = Some(pulse_width);
        self.dispatch(
            state,
            PendingCommand::Write {
                channel,
                pulse_width,
            },
        );
    }

    fn toggle(&self, channel: usize, enable: bool) {
        let action = if enable { "enable" } else { "disable" };
        let mut state = self.state.lock();
        if !self.accepts(&mut state, channel, action) {
            return;
        }
        let supported = if enable {
            self.capabilities.enable
        } else {
            self.capabilities.disable
        };
        if !supported {
            let reported = &mut state.missing_capabilities_reported;
            let first = if enable {
                !std::mem::replace(&mut reported.enable, true)
            } else {
                !std::mem::replace(&mut reported.disable, true)
            };
            if first {
                warn!(
                    "Unable to {action} servo on hardware '{}' channel {channel}: driver has no implementation",
                    self.name
                );
            } else {
                debug!(
                    "Unable to {action} servo on hardware '{}' channel {channel}: driver has no implementation",
                    self.name
                );
            }
            state.stats.capability_misses = state.stats.capability_misses.saturating_add(1);
            return;
        }
        debug!("{action} servo on hardware '{}' channel {channel}", self.name);
        let command = if enable {
            PendingCommand::Enable(channel)
        } else {
            PendingCommand::Disable(channel)
        };
        self.dispatch(&mut state, command);
    }

    fn dispatch(&self, state: &mut ControllerState, command: PendingCommand) {
        match self.write_mode {
            WriteMode::Immediate => state.execute(command),
            WriteMode::Deferred => state.pending.push(command),
        }
    }

    fn accepts(&self, state: &mut ControllerState, channel: usize, action: &str) -> bool {
        if state.disposed {
            warn!(
                "Ignoring {action} on hardware '{}' channel {channel}: controller is disposed",
                self.name
            );
        } else if channel >= self.channel_count {
            warn!(
                "Ignoring {action} on hardware '{}': channel {channel} outside {} channel bank",
                self.name, self.channel_count
            );
        } else {
            return true;
        }
        state.stats.commands_ignored = state.stats.commands_ignored.saturating_add(1);
        false
    }
}

impl core::fmt::Debug for ServoController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ServoController")
            .field("unique_hardware_name", &self.name)
            .field("channel_count", &self.channel_count)
            .field("write_mode", &self.write_mode)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::driver::mock::{DriverEvent, DriverProbe, RecordingDriver};
    use crate::error::ServoResult;
    use crate::hardware::HardwareConfig;
    use crate::model::{ServoDirection, ServoModel};
    use crate::range::Range;
    use crate::registry::ControllerRegistry;
    use tracing_test::traced_test;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn canonical() -> ServoResult<ServoModel> {
        ServoModel::new(
            Range::new(500.0, 1000.0, 1500.0)?,
            Range::new(-50.0, 0.0, 50.0)?,
            0.1,
            ServoDirection::HigherPwmClockwise,
        )
    }

    fn setup(
        driver: RecordingDriver,
        async_write: bool,
    ) -> ServoResult<(ControllerRegistry, Arc<ServoController>, DriverProbe)> {
        let probe = driver.probe();
        let registry = ControllerRegistry::new();
        let config = HardwareConfig::builder("TEST1")
            .channel_count(4)
            .async_write(async_write)
            .build()?;
        let controller = registry.create(HardwareInterface::new(driver, config)?)?;
        Ok((registry, controller, probe))
    }

    fn servo(controller: &Arc<ServoController>, channel: usize) -> ServoResult<Servo> {
        Servo::builder(canonical()?, Arc::clone(controller))
            .channel(channel)
            .build()
    }

    #[test]
    fn test_immediate_write() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let servo = servo(&controller, 1)?;

        controller.set_angle_degrees(&servo, 25.0);

        assert_eq!(probe.writes(), vec![(1, 1250)]);
        assert_eq!(controller.last_pulse_width(1), Some(1250));
        assert_eq!(controller.pending_len(), 0);
        Ok(())
    }

    #[test]
    fn test_duplicate_write_suppressed() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let servo = servo(&controller, 0)?;

        controller.set_angle_degrees(&servo, 10.0);
        controller.set_angle_degrees(&servo, 10.0);
        // 10.04deg rounds to the same pulse width
        controller.set_angle_degrees(&servo, 10.04);

        assert_eq!(probe.write_count(), 1);
        let stats = controller.stats();
        assert_eq!(stats.writes_issued, 1);
        assert_eq!(stats.writes_suppressed, 2);
        Ok(())
    }

    #[test]
    fn test_channels_deduplicate_independently() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let a = servo(&controller, 0)?;
        let b = servo(&controller, 1)?;

        controller.set_angle_degrees(&a, 10.0);
        controller.set_angle_degrees(&b, 10.0);

        assert_eq!(probe.writes(), vec![(0, 1100), (1, 1100)]);
        Ok(())
    }

    #[test]
    fn test_disable_blocks_writes_until_enabled() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::with_enable_disable(), false)?;
        let servo = servo(&controller, 2)?;

        controller.disable_servo(&servo);
        assert!(controller.is_disabled(&servo));
        controller.set_angle_degrees(&servo, 30.0);
        controller.set_angle_radians(&servo, 0.5);
        assert_eq!(probe.write_count(), 0);

        controller.enable_servo(&servo);
        assert!(!controller.is_disabled(&servo));
        controller.set_angle_degrees(&servo, 30.0);

        assert_eq!(
            probe.events(),
            vec![
                DriverEvent::Disable(2),
                DriverEvent::Enable(2),
                DriverEvent::Write {
                    channel: 2,
                    pulse_width: 1300
                },
            ]
        );
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_missing_capability_is_a_logged_no_op() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let servo = servo(&controller, 0)?;

        controller.disable_servo(&servo);

        assert!(!controller.is_disabled(&servo));
        assert!(probe.events().is_empty());
        assert_eq!(controller.stats().capability_misses, 1);
        assert!(logs_contain("Unable to disable servo"));

        controller.set_angle_degrees(&servo, 0.0);
        assert_eq!(probe.writes(), vec![(0, 1000)]);
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_missing_capability_warns_once_per_action() -> TestResult {
        let (_registry, controller, _probe) = setup(RecordingDriver::new(), false)?;
        let servo = servo(&controller, 0)?;

        for _ in 0..5 {
            controller.disable_servo(&servo);
        }
        controller.enable_servo(&servo);

        assert_eq!(controller.stats().capability_misses, 6);
        logs_assert(|lines: &[&str]| {
            let warned = |action: &str| {
                lines
                    .iter()
                    .filter(|line| line.contains("WARN") && line.contains(action))
                    .count()
            };
            match (warned("Unable to disable"), warned("Unable to enable")) {
                (1, 1) => Ok(()),
                counts => Err(format!("expected one warning per action, got {counts:?}")),
            }
        });
        Ok(())
    }

    #[test]
    fn test_deferred_write_runs_on_drain() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), true)?;
        let servo = servo(&controller, 0)?;

        controller.set_angle_degrees(&servo, -25.0);
        controller.set_angle_degrees(&servo, -25.0);

        assert_eq!(probe.write_count(), 0);
        assert_eq!(controller.last_pulse_width(0), Some(750));
        assert_eq!(controller.pending_len(), 1);

        assert_eq!(controller.run_pending(), 1);
        assert_eq!(probe.writes(), vec![(0, 750)]);
        assert_eq!(controller.run_pending(), 0);
        Ok(())
    }

    #[test]
    fn test_deferred_disable_sets_flag_on_drain() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::with_enable_disable(), true)?;
        let servo = servo(&controller, 3)?;

        controller.disable_servo(&servo);
        assert!(!controller.is_disabled(&servo));

        controller.run_pending();
        assert!(controller.is_disabled(&servo));
        assert_eq!(probe.events(), vec![DriverEvent::Disable(3)]);
        Ok(())
    }

    #[test]
    fn test_deferred_commands_keep_order() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::with_enable_disable(), true)?;
        let servo = servo(&controller, 1)?;

        controller.set_angle_degrees(&servo, 50.0);
        controller.disable_servo(&servo);
        controller.enable_servo(&servo);

        assert_eq!(controller.run_pending(), 3);
        assert_eq!(
            probe.events(),
            vec![
                DriverEvent::Write {
                    channel: 1,
                    pulse_width: 1500
                },
                DriverEvent::Disable(1),
                DriverEvent::Enable(1),
            ]
        );
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_traced_command_logs_single_trace() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let servo = servo(&controller, 0)?;

        controller.set_angle_degrees_traced(&servo, 25.0);

        assert_eq!(probe.writes(), vec![(0, 1250)]);
        assert!(logs_contain("set angle 25deg on hardware 'TEST1' channel 0"));
        assert!(!logs_contain("is disabled"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_traced_command_on_disabled_channel() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::with_enable_disable(), false)?;
        let servo = servo(&controller, 0)?;

        controller.disable_servo(&servo);
        controller.set_angle_degrees_traced(&servo, 25.0);

        assert_eq!(probe.write_count(), 0);
        assert!(logs_contain("is disabled, cannot set angle"));
        Ok(())
    }

    #[test]
    fn test_dispose_releases_driver_once() -> TestResult {
        let (registry, controller, probe) = setup(RecordingDriver::new(), false)?;

        controller.dispose();
        controller.dispose();

        assert_eq!(probe.dispose_count(), 1);
        assert!(controller.is_disposed());
        assert!(registry.get("TEST1").is_none());
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_dispose_discards_pending_commands() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::new(), true)?;
        let servo = servo(&controller, 0)?;

        controller.set_angle_degrees(&servo, 12.0);
        controller.dispose();

        assert_eq!(controller.run_pending(), 0);
        assert_eq!(probe.events(), vec![DriverEvent::Dispose]);
        assert!(logs_contain("Discarded 1 pending command(s)"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_commands_after_dispose_are_ignored() -> TestResult {
        let (_registry, controller, probe) = setup(RecordingDriver::with_enable_disable(), false)?;
        let servo = servo(&controller, 0)?;

        controller.dispose();
        probe.clear();
        controller.set_angle_degrees(&servo, 20.0);
        controller.disable_servo(&servo);

        assert!(probe.events().is_empty());
        assert_eq!(controller.stats().commands_ignored, 2);
        assert!(logs_contain("controller is disposed"));
        Ok(())
    }

    #[test]
    #[traced_test]
    fn test_foreign_channel_is_ignored() -> TestResult {
        let (registry, controller, probe) = setup(RecordingDriver::new(), false)?;
        let wide = registry.create(HardwareInterface::new(
            RecordingDriver::new(),
            HardwareConfig::new("WIDE", 16),
        )?)?;
        let far = Servo::builder(canonical()?, wide).channel(10).build()?;

        controller.set_angle_degrees(&far, 10.0);

        assert_eq!(probe.write_count(), 0);
        assert!(!controller.is_disabled(&far));
        assert_eq!(controller.stats().commands_ignored, 1);
        assert!(logs_contain("outside 4 channel bank"));
        Ok(())
    }

    #[test]
    fn test_controller_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServoController>();
    }
}
