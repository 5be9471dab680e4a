//! # Drive Executable
//!
//! Drives the RC car from the keyboard:
//! - Steering servo and drive motor through [`ActCtrl`]
//! - Keyboard input in either event or poll mode
//! - Optional camera capture, recording frames labelled with the steering angle
//!
//! The executable takes no arguments, configuration is read from `params/drive_exec.toml` and
//! `params/act_ctrl.toml`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the drive executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::time::Duration;
use color_eyre::{Result, eyre::WrapErr};
use log::{info, warn};

// Internal
use drive_lib::{
    act_ctrl::{self, ActCtrl, Throttle},
    input::{EventInput, InputMode, Key, KeyEvent, PollInput, Response, TermKeys},
    out_driver::OutputDriver,
};
#[cfg(feature = "cam")]
use drive_lib::cam::CamMonitor;
use params::DriveExecParams;
use util::{
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "drive_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("RC Car Drive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: DriveExecParams = util::params::load("drive_exec.toml")
        .wrap_err("Could not load drive_exec params")?;
    let act_params: act_ctrl::Params = util::params::load("act_ctrl.toml")
        .wrap_err("Could not load act_ctrl params")?;

    info!("Parameters loaded");

    // ---- OUTPUT DRIVER ----

    #[cfg(target_arch = "arm")]
    let driver = drive_lib::out_driver::RpiDriver::new()
        .wrap_err("Failed to open the GPIO")?;

    #[cfg(not(target_arch = "arm"))]
    let driver = {
        warn!("Not running on the car, outputs are simulated");
        drive_lib::out_driver::SimDriver::new()
    };

    run(&session, &exec_params, driver, act_params)
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn run<D: OutputDriver>(
    session: &Session,
    exec_params: &DriveExecParams,
    driver: D,
    act_params: act_ctrl::Params
) -> Result<()> {

    // ---- CAMERA ----

    // An unavailable camera is fatal, it must be opened before anything is actuated
    #[cfg(feature = "cam")]
    let mut cam = match exec_params.cam.enabled {
        true => Some(
            CamMonitor::open(&exec_params.cam, &session.data_root.join("frames"))
                .wrap_err("Failed to open the camera")?
        ),
        false => None
    };

    #[cfg(not(feature = "cam"))]
    {
        if exec_params.cam.enabled {
            return Err(color_eyre::eyre::eyre!(
                "The camera is enabled but drive_exec was built without the `cam` feature"
            ))
        }
        info!("Camera support not built, recording to {:?} disabled", session.data_root);
    }

    // ---- ACTUATION ----

    let mut ctrl = ActCtrl::new(driver, act_params)
        .wrap_err("Failed to initialise ActCtrl")?;

    info!("ActCtrl initialised");

    // ---- INPUT ----

    let mut keys = TermKeys::new(Duration::from_millis(exec_params.hold_timeout_ms))
        .wrap_err("Failed to set up the terminal")?;
    let mut event_input = EventInput::new();
    let mut poll_input = PollInput::new();

    let tick = Duration::from_millis(exec_params.tick_period_ms);

    match exec_params.input_mode {
        InputMode::Event => {
            info!("Event mode: W/S change speed, A/D steer, Q quits");

            if exec_params.cruise_speed_pct > 0 {
                info!("Cruising forward at {}%", exec_params.cruise_speed_pct);
                if let Err(e) = ctrl.cruise(Throttle::Forward, exec_params.cruise_speed_pct) {
                    warn!("{}", e);
                }
            }
        },
        InputMode::Poll => info!("Poll mode: hold W/S to drive, A/D to steer, Q quits")
    }

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let result = loop {
        let events = match keys.poll(tick) {
            Ok(e) => e,
            Err(e) => break Err(e).wrap_err("Failed to read the keyboard")
        };

        let quit = match exec_params.input_mode {
            InputMode::Event => log_faults(event_input.handle_all(&mut ctrl, events.iter().copied())),
            // A quick tap can be released before the tick samples it
            InputMode::Poll => log_faults(poll_input.tick(&mut ctrl, &keys))
                || events.contains(&KeyEvent::Press(Key::Quit))
        };

        #[cfg(feature = "cam")]
        {
            if let Some(cam) = cam.as_mut() {
                match cam.poll(ctrl.steering().angle_deg) {
                    Ok(Some(path)) => log::debug!("Recorded {:?}", path),
                    Ok(None) => (),
                    Err(e) => warn!("{}", e)
                }
            }
        }

        if quit {
            info!("Quit key pressed");
            break Ok(())
        }
    };

    // ---- SHUTDOWN ----

    info!("Shutting down...");

    if let Err(e) = ctrl.stop_all() {
        warn!("{}", e);
    }

    #[cfg(feature = "cam")]
    {
        if let Some(cam) = cam.take() {
            info!("Releasing camera after {} frames", cam.frames_captured());
        }
    }

    drop(keys);

    info!("Shutdown complete");

    result
}

/// Log any faults in the response, returning whether quit was requested.
fn log_faults(resp: Response) -> bool {
    for f in resp.faults.iter() {
        warn!("{}", f);
    }

    resp.quit
}
