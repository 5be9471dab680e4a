//! # Output Driver Module
//!
//! This module provides a unified PWM/GPIO output interface which can abstract over the physical
//! pins of the car's controller board and a simulated pin model.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// In-memory [`OutputDriver`] used off-target and in tests.
pub mod sim;

/// [`OutputDriver`] implementation for the Raspberry Pi GPIO header.
#[cfg(target_arch = "arm")]
pub mod rpi;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use sim::{SimDriver, SimPin};

#[cfg(target_arch = "arm")]
pub use rpi::RpiDriver;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for driving output pins.
///
/// Duty cycles are given in percent, between 0.0 and 100.0.
pub trait OutputDriver {

    /// Configure a pin for the given mode. Must be called before any other operation on the pin.
    fn setup(&mut self, pin: u8, mode: PinMode) -> Result<(), HwError>;

    /// Start PWM generation on a pin configured with [`PinMode::Pwm`].
    fn start(&mut self, pin: u8, initial_duty: f64) -> Result<(), HwError>;

    /// Change the duty cycle of a running PWM pin.
    fn change_duty_cycle(&mut self, pin: u8, duty: f64) -> Result<(), HwError>;

    /// Set the level of a pin configured with [`PinMode::Digital`].
    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), HwError>;

    /// Stop all PWM generation, drive every pin low and release them.
    fn cleanup(&mut self) -> Result<(), HwError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Modes an output pin can be configured in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PinMode {
    /// Plain digital output.
    Digital,

    /// PWM output at the given frequency.
    Pwm {
        frequency_hz: f64
    }
}

/// Digital output level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High
}

#[derive(thiserror::Error, Debug)]
pub enum HwError {
    #[error("Pin {0} has not been set up")]
    PinNotSetUp(u8),

    #[error("Pin {pin} is not configured as {expected}")]
    WrongMode {
        pin: u8,
        expected: &'static str
    },

    #[error("Duty cycle must be between 0 and 100%, got {0}")]
    InvalidDutyCycle(f64),

    #[error("PWM frequency must be positive, got {0} Hz")]
    InvalidFrequency(f64),

    #[error("The output pins have already been released")]
    Released,

    #[error("Simulated hardware fault on pin {0}")]
    SimulatedFault(u8),

    #[cfg(target_arch = "arm")]
    #[error("A GPIO error occured: {0}")]
    Gpio(#[from] rppal::gpio::Error)
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Check a duty cycle is inside the valid percentage range.
pub fn check_duty(duty: f64) -> Result<(), HwError> {
    if (0.0..=100.0).contains(&duty) {
        Ok(())
    }
    else {
        Err(HwError::InvalidDutyCycle(duty))
    }
}
