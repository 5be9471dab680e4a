//! # Drive library.
//!
//! This library allows other crates in the workspace to access items defined inside the drive
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuation control module - converts steer and throttle commands into servo and motor outputs
pub mod act_ctrl;

/// Camera module - captures and records labelled frames
pub mod cam;

/// Input module - keyboard adapters driving the actuation controller
pub mod input;

/// Output driver module - PWM and digital pins, real or simulated
pub mod out_driver;
