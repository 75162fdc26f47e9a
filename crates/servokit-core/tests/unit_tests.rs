//! Unit tests for the public servokit-core API.

#![cfg(test)]

use servokit_core::conversion::{
    effective_flip, pulse_width_for_degrees, pulse_width_for_radians, radians_to_degrees,
};
use servokit_core::prelude::*;
use servokit_test_helpers::prelude::*;

mod conversion_tests {
    use super::*;

    #[test]
    fn test_canonical_examples() {
        let model = canonical_model();
        let trim = ServoTrim::default();
        assert_eq!(pulse_width_for_degrees(&model, &trim, 0.0), 1000);
        assert_eq!(pulse_width_for_degrees(&model, &trim, 25.0), 1250);
        assert_eq!(pulse_width_for_degrees(&model, &trim, -50.0), 500);
        assert_eq!(pulse_width_for_degrees(&model, &trim, 60.0), 1500);
    }

    #[test]
    fn test_effective_flip_truth_table() {
        let normal = canonical_model_with(ServoDirection::HigherPwmClockwise);
        let inverted = canonical_model_with(ServoDirection::LowerPwmClockwise);
        let plain = ServoTrim::default();
        let flipped = ServoTrim {
            flip_direction: true,
            ..ServoTrim::default()
        };

        assert!(!effective_flip(&normal, &plain));
        assert!(effective_flip(&normal, &flipped));
        assert!(effective_flip(&inverted, &plain));
        assert!(!effective_flip(&inverted, &flipped));
    }

    #[test]
    fn test_negative_offset_clamps_low() {
        let model = canonical_model();
        let trim = ServoTrim {
            center_offset_pwm: -10.0,
            ..ServoTrim::default()
        };
        assert_eq!(pulse_width_for_degrees(&model, &trim, -50.0), 500);
        assert_eq!(pulse_width_for_degrees(&model, &trim, 0.0), 990);
        assert_eq!(pulse_width_for_degrees(&model, &trim, 50.0), 1490);
    }

    #[test]
    fn test_radians_entry_point() {
        let model = canonical_model();
        let trim = ServoTrim::default();
        let quarter_turn = core::f64::consts::FRAC_PI_4;
        assert_eq!(
            pulse_width_for_radians(&model, &trim, quarter_turn),
            pulse_width_for_degrees(&model, &trim, radians_to_degrees(quarter_turn))
        );
        assert_eq!(pulse_width_for_radians(&model, &trim, quarter_turn), 1450);
    }

    #[test]
    fn test_built_in_model_center() {
        let trim = ServoTrim::default();
        assert_eq!(pulse_width_for_degrees(&defaults::TURNIGY_TGY1501, &trim, 0.0), 1000);
        assert_eq!(pulse_width_for_degrees(&defaults::SAVOX_SH0256, &trim, 0.0), 1500);
        assert_eq!(pulse_width_for_degrees(&defaults::TOWERPRO_MG92B, &trim, 76.5), 720);
        assert_eq!(pulse_width_for_degrees(&defaults::TOWERPRO_MG92B, &trim, -76.5), 2280);
    }
}

mod configuration_tests {
    use super::*;

    #[test]
    fn test_range_rejects_misordered_natural() {
        let err = must_err(Range::new(500.0, 1600.0, 1500.0));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_model_builder_reports_missing_ranges() {
        let err = must_err(ServoModel::builder().build());
        assert!(matches!(err, ServoError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_hardware_config_from_json() -> TestResult {
        let config: HardwareConfig = serde_json::from_str(
            r#"{"unique_hardware_name": "pca9685@0x41", "channel_count": 16, "async_write": true}"#,
        )?;
        config.validate()?;
        assert_eq!(config.write_mode(), WriteMode::Deferred);
        Ok(())
    }

    #[test]
    fn test_channel_count_above_limit() {
        let result = HardwareConfig::builder("bus")
            .channel_count(MAX_CHANNELS + 1)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_servo_trim_from_json() -> TestResult {
        let trim: ServoTrim = serde_json::from_str(
            r#"{"center_offset_pwm": -12.5, "angle_clamp": {"min": -30.0, "max": null}}"#,
        )?;
        assert_eq!(trim.angle_clamp, Some(AngleClamp::at_least(-30.0)));
        assert!(!trim.flip_direction);
        Ok(())
    }

    #[test]
    fn test_servo_channel_must_fit_bank() {
        let rig = Rig::with_config(RigConfig {
            channel_count: 2,
            ..RigConfig::default()
        });
        let err = must_err(
            Servo::builder(canonical_model(), rig.controller.clone())
                .channel(2)
                .build(),
        );
        assert_eq!(err, ServoError::channel_out_of_range("TEST1", 2, 2));
    }
}

mod controller_tests {
    use super::*;

    #[test]
    fn test_servo_delegates_to_controller() {
        let rig = Rig::immediate();
        let servo = rig.canonical_servo(5);

        servo.set_angle_degrees(-20.0);
        assert_eq!(rig.probe.last_write(), Some((5, 800)));

        servo.disable();
        assert!(servo.is_disabled());
        servo.enable();
        assert!(!servo.is_disabled());
    }

    #[test]
    fn test_last_pulse_width_unset_until_written() {
        let rig = Rig::immediate();
        let servo = rig.canonical_servo(0);
        assert_eq!(rig.controller.last_pulse_width(0), None);
        servo.set_angle_degrees(0.0);
        assert_eq!(rig.controller.last_pulse_width(0), Some(1000));
        assert_eq!(rig.controller.last_pulse_width(99), None);
    }

    #[test]
    fn test_stats_count_every_outcome() {
        let rig = Rig::write_only();
        let servo = rig.canonical_servo(0);

        servo.set_angle_degrees(10.0);
        servo.set_angle_degrees(10.0);
        servo.disable();
        rig.controller.dispose();
        servo.set_angle_degrees(20.0);

        assert_eq!(
            rig.controller.stats(),
            ControllerStats {
                writes_issued: 1,
                writes_suppressed: 1,
                commands_ignored: 1,
                capability_misses: 1,
            }
        );
    }

    #[test]
    fn test_capabilities_reported() {
        assert_eq!(
            Rig::immediate().controller.capabilities(),
            DriverCapabilities::ENABLE_DISABLE
        );
        assert_eq!(
            Rig::write_only().controller.capabilities(),
            DriverCapabilities::WRITE_ONLY
        );
    }
}
