//! Parameters structure for ActCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Physical travel of the steering servo.
///
/// Units: degrees
pub const SERVO_RANGE_DEG: (i32, i32) = (0, 180);

/// Servo duty cycle at the two ends of [`SERVO_RANGE_DEG`].
///
/// Units: percent
pub const SERVO_DUTY_RANGE_PCT: (f64, f64) = (2.0, 12.0);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Actuation control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- PINS ----

    /// PWM pin driving the steering servo.
    pub str_servo_pin: u8,

    /// PWM pin driving the drive motor's H-bridge enable.
    pub drv_pwm_pin: u8,

    /// Direction pins of the drive motor's H-bridge, `[IN1, IN2]`.
    pub drv_dir_pins: [u8; 2],

    /// Units: hertz
    pub str_pwm_freq_hz: f64,

    /// Units: hertz
    pub drv_pwm_freq_hz: f64,

    // ---- STEERING ----

    /// Straight ahead.
    ///
    /// Units: degrees
    pub str_neutral_deg: i32,

    /// Units: degrees
    pub str_min_deg: i32,

    /// Units: degrees
    pub str_max_deg: i32,

    /// Change in angle for one steer command.
    ///
    /// Units: degrees
    pub str_step_deg: i32,

    /// Time the servo pulse is held before the line is returned to idle.
    ///
    /// Units: milliseconds
    pub str_settle_ms: u64,

    // ---- DRIVE ----

    /// Units: percent duty cycle
    pub drv_max_speed_pct: u8,

    /// Units: percent duty cycle
    pub drv_accel_step_pct: u8,

    /// Units: percent duty cycle
    pub drv_decel_step_pct: u8,
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("Steering limits must satisfy 0 <= min ({min}) <= neutral ({neutral}) <= max ({max}) <= 180")]
    InvalidSteerLimits {
        min: i32,
        neutral: i32,
        max: i32
    },

    #[error("Step sizes must be non-zero")]
    ZeroStep,

    #[error("Maximum speed must be at most 100%, got {0}")]
    InvalidMaxSpeed(u8),

    #[error("PWM frequencies must be positive")]
    InvalidFrequency,

    #[error("Not all pins are unique")]
    NonUniquePins
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {

    /// Determines if the parameters are valid.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        let (lo, hi) = SERVO_RANGE_DEG;

        if !(lo <= self.str_min_deg
            && self.str_min_deg <= self.str_neutral_deg
            && self.str_neutral_deg <= self.str_max_deg
            && self.str_max_deg <= hi)
        {
            return Err(ParamsError::InvalidSteerLimits {
                min: self.str_min_deg,
                neutral: self.str_neutral_deg,
                max: self.str_max_deg
            })
        }

        if self.str_step_deg <= 0
            || self.drv_accel_step_pct == 0
            || self.drv_decel_step_pct == 0
        {
            return Err(ParamsError::ZeroStep)
        }

        if self.drv_max_speed_pct > 100 {
            return Err(ParamsError::InvalidMaxSpeed(self.drv_max_speed_pct))
        }

        if !(self.str_pwm_freq_hz > 0.0 && self.drv_pwm_freq_hz > 0.0) {
            return Err(ParamsError::InvalidFrequency)
        }

        let pins = [
            self.str_servo_pin,
            self.drv_pwm_pin,
            self.drv_dir_pins[0],
            self.drv_dir_pins[1]
        ];
        for (i, p) in pins.iter().enumerate() {
            if pins[i + 1..].contains(p) {
                return Err(ParamsError::NonUniquePins)
            }
        }

        Ok(())
    }
}

impl Default for Params {
    /// Pins are the BCM numbers of header pins 33 (servo), 32 (drive PWM), 29 and 31 (direction).
    fn default() -> Self {
        Self {
            str_servo_pin: 13,
            drv_pwm_pin: 12,
            drv_dir_pins: [5, 6],
            str_pwm_freq_hz: 50.0,
            drv_pwm_freq_hz: 1000.0,
            str_neutral_deg: 90,
            str_min_deg: 30,
            str_max_deg: 150,
            str_step_deg: 30,
            str_settle_ms: 100,
            drv_max_speed_pct: 75,
            drv_accel_step_pct: 5,
            drv_decel_step_pct: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        assert!(Params::default().are_valid().is_ok());
    }

    #[test]
    fn test_shipped_params_valid() {
        let p: Params = util::params::load_from(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/act_ctrl.toml")
        ).unwrap();

        assert!(p.are_valid().is_ok());
        assert_eq!((p.str_min_deg, p.str_neutral_deg, p.str_max_deg), (30, 90, 150));
    }

    #[test]
    fn test_invalid_params() {
        let mut p = Params::default();
        p.str_neutral_deg = 160;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidSteerLimits { .. })));

        let mut p = Params::default();
        p.str_max_deg = 200;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidSteerLimits { .. })));

        let mut p = Params::default();
        p.drv_decel_step_pct = 0;
        assert!(matches!(p.are_valid(), Err(ParamsError::ZeroStep)));

        let mut p = Params::default();
        p.drv_max_speed_pct = 101;
        assert!(matches!(p.are_valid(), Err(ParamsError::InvalidMaxSpeed(101))));

        let mut p = Params::default();
        p.drv_dir_pins = [5, 12];
        assert!(matches!(p.are_valid(), Err(ParamsError::NonUniquePins)));
    }
}
