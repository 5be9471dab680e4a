//! # Drive Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use drive_lib::{cam::CamParams, input::InputMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug)]
pub struct DriveExecParams {

    /// Which input adapter drives the car
    pub input_mode: InputMode,

    /// Period of one control cycle
    ///
    /// Units: milliseconds
    pub tick_period_ms: u64,

    /// Time without a key-down or repeat after which a key counts as released. Must be longer
    /// than the terminal's initial key repeat delay.
    ///
    /// Units: milliseconds
    pub hold_timeout_ms: u64,

    /// Speed to drive forward at from startup in event mode, zero to start stopped
    ///
    /// Units: percent duty cycle
    pub cruise_speed_pct: u8,

    /// Camera configuration
    #[serde(default)]
    pub cam: CamParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_params() {
        let p: DriveExecParams = util::params::load_from(
            concat!(env!("CARGO_MANIFEST_DIR"), "/../params/drive_exec.toml")
        ).unwrap();

        assert_eq!(p.input_mode, InputMode::Poll);
        // X11's default key repeat delay is 660 ms
        assert!(p.hold_timeout_ms > 660);
        assert_eq!(p.cam.resolution, (640, 480));
        assert!(!p.cam.enabled);
    }

    #[test]
    fn test_cam_section_optional() {
        let p: DriveExecParams = util::params::from_str(
            "input_mode = \"event\"\ntick_period_ms = 50\nhold_timeout_ms = 500\ncruise_speed_pct = 0\n"
        ).unwrap();

        assert_eq!(p.input_mode, InputMode::Event);
        assert!(!p.cam.enabled);
    }
}
