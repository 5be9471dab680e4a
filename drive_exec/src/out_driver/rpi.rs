//! [`OutputDriver`] implementation for the Raspberry Pi GPIO header, using rppal's software PWM
//!
//! Pins are identified by their BCM number.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use log::trace;
use rppal::gpio::{self, Gpio, OutputPin};

use super::{check_duty, HwError, Level, OutputDriver, PinMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct RpiDriver {
    gpio: Gpio,

    pins: HashMap<u8, RpiPin>,

    released: bool,
}

struct RpiPin {
    out: OutputPin,
    mode: PinMode,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RpiDriver {
    pub fn new() -> Result<Self, HwError> {
        Ok(Self {
            gpio: Gpio::new()?,
            pins: HashMap::new(),
            released: false,
        })
    }

    fn pin_mut(&mut self, pin: u8) -> Result<&mut RpiPin, HwError> {
        if self.released {
            return Err(HwError::Released)
        }

        self.pins.get_mut(&pin).ok_or(HwError::PinNotSetUp(pin))
    }

    fn set_pwm(&mut self, pin: u8, duty: f64) -> Result<(), HwError> {
        check_duty(duty)?;

        let p = self.pin_mut(pin)?;
        let frequency_hz = match p.mode {
            PinMode::Pwm { frequency_hz } => frequency_hz,
            PinMode::Digital => return Err(HwError::WrongMode { pin, expected: "PWM" })
        };

        p.out.set_pwm_frequency(frequency_hz, duty / 100.0)?;

        trace!("rpi: pin {} duty {:.2}% at {} Hz", pin, duty, frequency_hz);

        Ok(())
    }
}

impl OutputDriver for RpiDriver {
    fn setup(&mut self, pin: u8, mode: PinMode) -> Result<(), HwError> {
        if self.released {
            return Err(HwError::Released)
        }

        if let PinMode::Pwm { frequency_hz } = mode {
            if !(frequency_hz > 0.0) {
                return Err(HwError::InvalidFrequency(frequency_hz))
            }
        }

        let mut out = self.gpio.get(pin)?.into_output_low();
        out.set_reset_on_drop(true);

        self.pins.insert(pin, RpiPin { out, mode });

        Ok(())
    }

    fn start(&mut self, pin: u8, initial_duty: f64) -> Result<(), HwError> {
        self.set_pwm(pin, initial_duty)
    }

    fn change_duty_cycle(&mut self, pin: u8, duty: f64) -> Result<(), HwError> {
        self.set_pwm(pin, duty)
    }

    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), HwError> {
        let p = self.pin_mut(pin)?;
        match p.mode {
            PinMode::Digital => (),
            PinMode::Pwm { .. } => return Err(HwError::WrongMode { pin, expected: "digital" })
        }

        p.out.write(match level {
            Level::Low => gpio::Level::Low,
            Level::High => gpio::Level::High
        });

        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), HwError> {
        let mut first_err = None;

        for (_, mut p) in self.pins.drain() {
            if let PinMode::Pwm { .. } = p.mode {
                if let Err(e) = p.out.clear_pwm() {
                    first_err.get_or_insert(HwError::Gpio(e));
                }
            }
            p.out.set_low();
        }

        self.released = true;

        match first_err {
            Some(e) => Err(e),
            None => Ok(())
        }
    }
}
