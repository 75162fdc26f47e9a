//! Calibration data for common hobby servos.
//!
//! Pulse widths are in microseconds, angles in degrees, speed in seconds per
//! 60 degrees at nominal voltage.

use crate::model::{ServoDirection, ServoModel};
use crate::range::Range;

/// Turnigy TGY-1501MG.
pub const TURNIGY_TGY1501: ServoModel = ServoModel::from_parts(
    Range::from_parts(660.0, 1000.0, 1280.0),
    Range::from_parts(-60.0, 0.0, 60.0),
    0.14,
    ServoDirection::HigherPwmClockwise,
);

/// Turnigy TGY-4409MD.
pub const TURNIGY_TGY4409MD: ServoModel = ServoModel::from_parts(
    Range::from_parts(528.0, 1500.0, 2496.0),
    Range::from_parts(-90.0, 0.0, 90.0),
    0.11,
    ServoDirection::HigherPwmClockwise,
);

/// TowerPro MG92B. Turns counter-clockwise as the pulse width grows.
pub const TOWERPRO_MG92B: ServoModel = ServoModel::from_parts(
    Range::from_parts(720.0, 1500.0, 2280.0),
    Range::from_parts(-76.5, 0.0, 76.5),
    0.08,
    ServoDirection::LowerPwmClockwise,
);

/// Corona DS339HV.
pub const CORONA_DS339HV: ServoModel = ServoModel::from_parts(
    Range::from_parts(750.0, 1500.0, 2250.0),
    Range::from_parts(-75.0, 0.0, 75.0),
    0.11,
    ServoDirection::HigherPwmClockwise,
);

/// Savox SH-0256.
pub const SAVOX_SH0256: ServoModel = ServoModel::from_parts(
    Range::from_parts(750.0, 1500.0, 2250.0),
    Range::from_parts(-72.5, 0.0, 72.5),
    0.11,
    ServoDirection::HigherPwmClockwise,
);

/// Every built-in model with its configuration name.
pub const ALL: &[(&str, ServoModel)] = &[
    ("Turnigy_TGY1501", TURNIGY_TGY1501),
    ("Turnigy_TGY4409MD", TURNIGY_TGY4409MD),
    ("TowerPro_MG92B", TOWERPRO_MG92B),
    ("Corona_DS339HV", CORONA_DS339HV),
    ("Savox_SH0256", SAVOX_SH0256),
];

/// Find a built-in model by configuration name, ignoring ASCII case.
#[must_use]
pub fn lookup(name: &str) -> Option<ServoModel> {
    ALL.iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, model)| *model)
}
