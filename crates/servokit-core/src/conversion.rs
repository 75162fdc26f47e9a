//! Angle to pulse-width conversion.
//!
//! The conversion is a pure function of a [`ServoModel`], the per-unit
//! [`ServoTrim`] and a target angle in degrees:
//!
//! 1. non-numeric angles become `0`;
//! 2. the per-unit [`AngleClamp`](crate::AngleClamp) is applied, each bound on
//!    its own side;
//! 3. the sign of the angle picks the angle endpoint (min for negative, max
//!    otherwise) so asymmetric travel scales correctly on each side;
//! 4. the sign of the angle after the effective flip picks the pulse-width
//!    endpoint;
//! 5. the result is interpolated linearly from the natural pulse width toward
//!    that endpoint, offset by the unit's center trim and clamped to the
//!    model's pulse-width range.
//!
//! Rounding to an integer pulse width happens in [`round_pulse_width`].

use core::f64::consts::PI;

use crate::model::ServoModel;
use crate::servo::ServoTrim;
use crate::trace::PwmTrace;

/// Convert radians to the degrees used by every conversion entry point.
///
/// Radian commands go through this helper and then through the degree path,
/// so a radian command and a degree command with the converted value always
/// produce the same pulse width.
#[must_use]
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Whether the model's polarity and the unit's flip combine into an inverted
/// pulse-width direction.
///
/// The two inversions compose by negation, so a flipped unit of a
/// [`LowerPwmClockwise`](crate::ServoDirection::LowerPwmClockwise) model
/// behaves like an unflipped unit of a normal model.
#[must_use]
pub fn effective_flip(model: &ServoModel, trim: &ServoTrim) -> bool {
    trim.flip_direction ^ model.direction().is_inverted()
}

/// Compute the unrounded, range-clamped pulse width for `angle_degrees`.
///
/// When `trace` is given, every decision is recorded into it.
#[must_use]
pub fn angle_to_pwm(
    model: &ServoModel,
    trim: &ServoTrim,
    angle_degrees: f64,
    mut trace: Option<&mut PwmTrace>,
) -> f64 {
    let flip = effective_flip(model, trim);

    let mut angle = angle_degrees;
    if angle.is_nan() {
        angle = 0.0;
        note(&mut trace, || "angle is not a number, using 0deg".to_string());
    }

    match trim.angle_clamp {
        Some(clamp) if !clamp.is_unbounded() => {
            angle = clamp.apply(angle);
            note(&mut trace, || {
                format!(
                    "angle clamp min {} max {}, angle now {angle}deg",
                    bound(clamp.min),
                    bound(clamp.max)
                )
            });
        }
        _ => note(&mut trace, || "no angle clamp set".to_string()),
    }

    let angle_range = model.angle_range();
    let pwm_range = model.pwm_range();

    let angle_endpoint = if angle < 0.0 {
        angle_range.min()
    } else {
        angle_range.max()
    };
    note(&mut trace, || {
        if angle < 0.0 {
            format!("angle < 0, scaling against angle range min {angle_endpoint}")
        } else {
            format!("angle >= 0, scaling against angle range max {angle_endpoint}")
        }
    });

    let sign_source = if flip { -angle } else { angle };
    let pwm_endpoint = if sign_source < 0.0 {
        pwm_range.min()
    } else {
        pwm_range.max()
    };
    note(&mut trace, || {
        let side = if sign_source < 0.0 { "min" } else { "max" };
        if flip {
            format!("direction flipped, interpolating toward pwm range {side} {pwm_endpoint}")
        } else {
            format!("direction not flipped, interpolating toward pwm range {side} {pwm_endpoint}")
        }
    });

    let natural = pwm_range.natural();
    let pwm_diff = pwm_endpoint - natural;
    let ratio = angle / angle_endpoint;
    // An infinite ratio against a zero span would otherwise yield NaN.
    let travel = if pwm_diff == 0.0 { 0.0 } else { pwm_diff * ratio };
    let mut pwm = natural + travel;
    note(&mut trace, || {
        format!("ratio {ratio} of angle endpoint, natural pwm {natural}, interpolated pwm {pwm}")
    });

    pwm += trim.center_offset_pwm;
    note(&mut trace, || {
        if trim.center_offset_pwm == 0.0 {
            "no center offset".to_string()
        } else {
            format!(
                "center offset {}, adjusted pwm {pwm}",
                trim.center_offset_pwm
            )
        }
    });

    let pwm = pwm_range.clamp(pwm);
    note(&mut trace, || {
        format!(
            "final pwm {pwm}, clamped to [{}, {}]",
            pwm_range.min(),
            pwm_range.max()
        )
    });
    pwm
}

/// Round a pulse width to the nearest integer unit, halves toward positive
/// infinity.
#[must_use]
pub fn round_pulse_width(pwm: f64) -> i32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "pulse widths are clamped to a pwm range that ServoModel::new bounds to i32"
    )]
    let rounded = (pwm + 0.5).floor() as i32;
    rounded
}

/// Full conversion from degrees to the integer pulse width sent to hardware.
#[must_use]
pub fn pulse_width_for_degrees(model: &ServoModel, trim: &ServoTrim, angle_degrees: f64) -> i32 {
    round_pulse_width(angle_to_pwm(model, trim, angle_degrees, None))
}

/// Full conversion from radians to the integer pulse width sent to hardware.
#[must_use]
pub fn pulse_width_for_radians(model: &ServoModel, trim: &ServoTrim, angle_radians: f64) -> i32 {
    pulse_width_for_degrees(model, trim, radians_to_degrees(angle_radians))
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "unset".to_string(), |v| format!("{v}deg"))
}

fn note(trace: &mut Option<&mut PwmTrace>, step: impl FnOnce() -> String) {
    if let Some(trace) = trace.as_deref_mut() {
        trace.record(step());
    }
}
