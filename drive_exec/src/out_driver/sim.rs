//! [`OutputDriver`] implementation backed by an in-memory pin model

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;
use log::trace;

use super::{check_duty, HwError, Level, OutputDriver, PinMode};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated output board.
///
/// Every write is recorded so the last commanded state of each pin can be inspected.
#[derive(Debug, Default)]
pub struct SimDriver {
    pins: HashMap<u8, SimPin>,

    /// Number of upcoming writes which will fail with [`HwError::SimulatedFault`].
    faults_pending: usize,

    released: bool,

    cleanup_count: usize,
}

/// The last commanded state of a simulated pin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimPin {
    pub mode: PinMode,

    /// Whether PWM generation has been started.
    pub running: bool,

    /// Duty cycle in percent (PWM pins).
    pub duty: f64,

    /// Output level (digital pins).
    pub level: Level,

    /// Number of successful writes made to the pin after setup.
    pub writes: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` writes fail.
    pub fn fail_next(&mut self, n: usize) {
        self.faults_pending = n;
    }

    /// Get the state of a pin, or `None` if it was never set up.
    pub fn pin(&self, pin: u8) -> Option<&SimPin> {
        self.pins.get(&pin)
    }

    /// Whether `cleanup` has been called.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Number of times `cleanup` has been called.
    pub fn cleanup_count(&self) -> usize {
        self.cleanup_count
    }

    /// Look up a pin for writing, consuming an injected fault if there is one.
    fn pin_for_write(&mut self, pin: u8) -> Result<&mut SimPin, HwError> {
        if self.released {
            return Err(HwError::Released)
        }

        if self.faults_pending > 0 {
            self.faults_pending -= 1;
            return Err(HwError::SimulatedFault(pin))
        }

        self.pins.get_mut(&pin).ok_or(HwError::PinNotSetUp(pin))
    }
}

impl OutputDriver for SimDriver {
    fn setup(&mut self, pin: u8, mode: PinMode) -> Result<(), HwError> {
        if self.released {
            return Err(HwError::Released)
        }

        if let PinMode::Pwm { frequency_hz } = mode {
            if !(frequency_hz > 0.0) {
                return Err(HwError::InvalidFrequency(frequency_hz))
            }
        }

        trace!("sim: setup pin {} as {:?}", pin, mode);

        self.pins.insert(pin, SimPin {
            mode,
            running: false,
            duty: 0.0,
            level: Level::Low,
            writes: 0,
        });

        Ok(())
    }

    fn start(&mut self, pin: u8, initial_duty: f64) -> Result<(), HwError> {
        check_duty(initial_duty)?;

        let p = self.pin_for_write(pin)?;
        match p.mode {
            PinMode::Pwm { .. } => (),
            PinMode::Digital => return Err(HwError::WrongMode { pin, expected: "PWM" })
        }

        p.running = true;
        p.duty = initial_duty;
        p.writes += 1;

        trace!("sim: start pin {} at {:.2}%", pin, initial_duty);

        Ok(())
    }

    fn change_duty_cycle(&mut self, pin: u8, duty: f64) -> Result<(), HwError> {
        check_duty(duty)?;

        let p = self.pin_for_write(pin)?;
        match p.mode {
            PinMode::Pwm { .. } if p.running => (),
            _ => return Err(HwError::WrongMode { pin, expected: "running PWM" })
        }

        p.duty = duty;
        p.writes += 1;

        trace!("sim: pin {} duty {:.2}%", pin, duty);

        Ok(())
    }

    fn set_digital(&mut self, pin: u8, level: Level) -> Result<(), HwError> {
        let p = self.pin_for_write(pin)?;
        match p.mode {
            PinMode::Digital => (),
            PinMode::Pwm { .. } => return Err(HwError::WrongMode { pin, expected: "digital" })
        }

        p.level = level;
        p.writes += 1;

        trace!("sim: pin {} {:?}", pin, level);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), HwError> {
        for p in self.pins.values_mut() {
            p.running = false;
            p.duty = 0.0;
            p.level = Level::Low;
        }

        self.released = true;
        self.cleanup_count += 1;

        trace!("sim: cleanup");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_pwm_lifecycle() {
        let mut drv = SimDriver::new();
        drv.setup(12, PinMode::Pwm { frequency_hz: 1000.0 }).unwrap();

        // Duty changes are rejected until the channel is started
        assert!(drv.change_duty_cycle(12, 10.0).is_err());

        drv.start(12, 0.0).unwrap();
        drv.change_duty_cycle(12, 42.5).unwrap();
        assert_eq!(drv.pin(12).unwrap().duty, 42.5);

        assert!(matches!(
            drv.change_duty_cycle(12, 100.5),
            Err(HwError::InvalidDutyCycle(_))
        ));
        assert!(matches!(
            drv.set_digital(12, Level::High),
            Err(HwError::WrongMode { pin: 12, .. })
        ));
    }

    #[test]
    fn test_sim_unknown_pin() {
        let mut drv = SimDriver::new();
        assert!(matches!(drv.set_digital(5, Level::High), Err(HwError::PinNotSetUp(5))));
        assert!(matches!(
            drv.setup(5, PinMode::Pwm { frequency_hz: 0.0 }),
            Err(HwError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_sim_fault_injection() {
        let mut drv = SimDriver::new();
        drv.setup(5, PinMode::Digital).unwrap();
        drv.fail_next(1);

        assert!(matches!(drv.set_digital(5, Level::High), Err(HwError::SimulatedFault(5))));
        assert_eq!(drv.pin(5).unwrap().level, Level::Low);

        drv.set_digital(5, Level::High).unwrap();
        assert_eq!(drv.pin(5).unwrap().level, Level::High);
    }

    #[test]
    fn test_sim_cleanup_releases() {
        let mut drv = SimDriver::new();
        drv.setup(5, PinMode::Digital).unwrap();
        drv.set_digital(5, Level::High).unwrap();
        drv.cleanup().unwrap();

        assert!(drv.is_released());
        assert_eq!(drv.pin(5).unwrap().level, Level::Low);
        assert!(matches!(drv.set_digital(5, Level::High), Err(HwError::Released)));
    }
}
