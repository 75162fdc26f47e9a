//! Sweep two servos across their travel on a recording driver.
//!
//! Run with `RUST_LOG=debug cargo run -p servokit-core --example sweep` to see
//! the conversion traces.

use std::sync::Arc;

use servokit_core::driver::mock::RecordingDriver;
use servokit_core::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: HardwareConfig = serde_json::from_str(
        r#"{"unique_hardware_name": "pca9685@0x40", "channel_count": 16, "async_write": true}"#,
    )?;

    let driver = RecordingDriver::with_enable_disable();
    let probe = driver.probe();
    let registry = ControllerRegistry::new();
    let controller = registry.create(HardwareInterface::new(driver, config)?)?;

    let model = defaults::lookup("TowerPro_MG92B").ok_or("unknown servo model")?;
    let pan = Servo::builder(model, Arc::clone(&controller))
        .channel(0)
        .center_offset_pwm(-8.0)
        .build()?;
    let tilt = Servo::builder(defaults::SAVOX_SH0256, Arc::clone(&controller))
        .channel(1)
        .angle_clamp(AngleClamp::new(-30.0, 45.0))
        .build()?;

    for step in -4..=4 {
        let angle = f64::from(step) * 20.0;
        pan.set_angle_degrees_traced(angle);
        tilt.set_angle_degrees_traced(angle);
        let ran = controller.run_pending();
        info!(
            "angle {angle:>6.1}: pan {:?}, tilt {:?} ({ran} driver calls)",
            controller.last_pulse_width(0),
            controller.last_pulse_width(1)
        );
    }

    tilt.disable();
    tilt.set_angle_degrees(0.0);
    controller.run_pending();
    info!("tilt disabled: {}", tilt.is_disabled());

    controller.dispose();
    info!(
        "{} driver calls recorded, {:?}",
        probe.events().len(),
        controller.stats()
    );
    Ok(())
}
