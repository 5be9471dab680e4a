//! # Actuation control module
//!
//! Translates steer and throttle commands into servo and drive motor outputs. The controller
//! owns the output driver and the two pieces of actuator state:
//!
//! - [`SteeringState`], the commanded servo angle, kept inside the configured limits.
//! - [`DriveState`], the drive duty cycle and motor direction, which always change as a pair.
//!
//! Outputs are written through an [`OutputDriver`](crate::out_driver::OutputDriver). A failed
//! write is returned to the caller and the output is re-sent on the next command for it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::out_driver::{HwError, Level};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Commanded steering servo position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SteeringState {
    /// Units: degrees
    pub angle_deg: i32
}

/// Commanded drive motor output.
///
/// `speed_pct` is zero if and only if `direction` is [`MotorDirection::Stopped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriveState {
    /// Units: percent duty cycle
    pub speed_pct: u8,

    pub direction: MotorDirection
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction to move the steering in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerDirection {
    Left,
    Right
}

/// Direction to accelerate the car in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Throttle {
    Forward,
    Backward
}

/// Rotation direction selected on the drive motor's H-bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotorDirection {
    Forward,
    Backward,
    Stopped
}

/// Possible errors that can occur while initialising ActCtrl.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Actuation parameters are invalid: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Failed to set up the output pins: {0}")]
    Hw(#[source] HwError)
}

/// Possible errors that can occur during ActCtrl operation.
///
/// In all cases the controller's state has already been updated, only the physical output may
/// lag behind it.
#[derive(Debug, thiserror::Error)]
pub enum ActCtrlError {
    #[error("Failed to command the steering servo to {angle_deg} deg: {source}")]
    Steer {
        angle_deg: i32,
        source: HwError
    },

    #[error("Failed to command the drive motor {direction:?} at {speed_pct}%: {source}")]
    Drive {
        direction: MotorDirection,
        speed_pct: u8,
        source: HwError
    },

    #[error("Failed to release the outputs cleanly: {0}")]
    Shutdown(#[source] HwError),

    #[error("The outputs have been released, no further commands can be issued")]
    Released
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for DriveState {
    fn default() -> Self {
        Self {
            speed_pct: 0,
            direction: MotorDirection::Stopped
        }
    }
}

impl From<Throttle> for MotorDirection {
    fn from(t: Throttle) -> Self {
        match t {
            Throttle::Forward => MotorDirection::Forward,
            Throttle::Backward => MotorDirection::Backward
        }
    }
}

impl MotorDirection {
    /// Levels of the `[IN1, IN2]` direction pins selecting this direction.
    pub fn pin_levels(&self) -> [Level; 2] {
        match self {
            MotorDirection::Forward => [Level::High, Level::Low],
            MotorDirection::Backward => [Level::Low, Level::High],
            MotorDirection::Stopped => [Level::Low, Level::Low]
        }
    }
}
