//! Implementations for the ActCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::thread;
use std::time::Duration;
use log::{debug, info, warn};

// Internal
use super::{
    ActCtrlError, DriveState, InitError, MotorDirection, Params, SteerDirection, SteeringState,
    Throttle, SERVO_DUTY_RANGE_PCT, SERVO_RANGE_DEG
};
use crate::out_driver::{HwError, Level, OutputDriver, PinMode};
use util::maths::lin_map;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Actuation control module state
pub struct ActCtrl<D: OutputDriver> {

    params: Params,

    driver: D,

    steering: SteeringState,

    drive: DriveState,

    /// Set when the last steering write failed, forcing the next steer command to re-send.
    str_stale: bool,

    /// Set when the last drive write failed, forcing the next drive command to re-send.
    drv_stale: bool,

    released: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<D: OutputDriver> ActCtrl<D> {

    /// Create the controller, taking ownership of the output driver.
    ///
    /// Sets up the servo, drive PWM and direction pins, starts both PWM channels at zero duty
    /// with the motor stopped, and centres the steering.
    pub fn new(mut driver: D, params: Params) -> Result<Self, InitError> {
        params.are_valid()?;

        let str_mode = PinMode::Pwm { frequency_hz: params.str_pwm_freq_hz };
        let drv_mode = PinMode::Pwm { frequency_hz: params.drv_pwm_freq_hz };

        (|| -> Result<(), HwError> {
            driver.setup(params.str_servo_pin, str_mode)?;
            driver.setup(params.drv_pwm_pin, drv_mode)?;
            for &pin in params.drv_dir_pins.iter() {
                driver.setup(pin, PinMode::Digital)?;
                driver.set_digital(pin, Level::Low)?;
            }
            driver.start(params.str_servo_pin, 0.0)?;
            driver.start(params.drv_pwm_pin, 0.0)
        })().map_err(InitError::Hw)?;

        let mut ctrl = Self {
            steering: SteeringState { angle_deg: params.str_neutral_deg },
            drive: DriveState::default(),
            params,
            driver,
            str_stale: false,
            drv_stale: false,
            released: false
        };

        // Centre the servo, a failure here is a setup failure
        if let Err(ActCtrlError::Steer { source, .. }) = ctrl.emit_steering() {
            return Err(InitError::Hw(source))
        }

        info!("ActCtrl initialised, steering at {} deg", ctrl.steering.angle_deg);

        Ok(ctrl)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn steering(&self) -> SteeringState {
        self.steering
    }

    pub fn drive(&self) -> DriveState {
        self.drive
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Whether [`ActCtrl::stop_all`] has released the outputs.
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Move the steering one step in the given direction.
    ///
    /// The angle is clamped to the steering limits, a step past a limit leaves the angle
    /// unchanged. The servo is only pulsed if the angle changed, or if the previous steering
    /// write failed.
    pub fn steer(&mut self, direction: SteerDirection) -> Result<(), ActCtrlError> {
        if self.released {
            return Err(ActCtrlError::Released)
        }

        let step = match direction {
            SteerDirection::Left => -self.params.str_step_deg,
            SteerDirection::Right => self.params.str_step_deg
        };

        let target = (self.steering.angle_deg + step)
            .clamp(self.params.str_min_deg, self.params.str_max_deg);

        let changed = target != self.steering.angle_deg;
        self.steering.angle_deg = target;

        if changed {
            info!("Steer {:?}: angle {} deg", direction, target);
        }

        if changed || self.str_stale {
            self.emit_steering()
        }
        else {
            Ok(())
        }
    }

    /// Increase the drive speed by one step and set the direction, up to the max speed.
    ///
    /// Accelerating against the current direction reverses straight away at the increased
    /// speed, as the direction pins are written before the duty cycle.
    pub fn accelerate(&mut self, throttle: Throttle) -> Result<(), ActCtrlError> {
        let speed_pct = self.drive.speed_pct
            .saturating_add(self.params.drv_accel_step_pct)
            .min(self.params.drv_max_speed_pct);

        self.apply_drive(moving(speed_pct, throttle.into()))
    }

    /// Reduce the drive speed by one step toward zero, keeping the current direction.
    pub fn decelerate(&mut self) -> Result<(), ActCtrlError> {
        let target = braked(self.drive, self.params.drv_decel_step_pct);
        self.apply_drive(target)
    }

    /// Drive at a fixed speed in the given direction, clamped to the max speed.
    pub fn cruise(&mut self, throttle: Throttle, speed_pct: u8) -> Result<(), ActCtrlError> {
        let speed_pct = speed_pct.min(self.params.drv_max_speed_pct);
        self.apply_drive(moving(speed_pct, throttle.into()))
    }

    /// Zero all outputs and release the pins.
    ///
    /// Every output is zeroed even if an earlier one fails, the first failure is returned.
    /// Calling this again after the outputs are released does nothing.
    pub fn stop_all(&mut self) -> Result<(), ActCtrlError> {
        if self.released {
            return Ok(())
        }

        info!("Stopping all outputs");

        self.drive = DriveState::default();
        self.released = true;

        let p = &self.params;
        let results = vec![
            self.driver.change_duty_cycle(p.drv_pwm_pin, 0.0),
            self.driver.set_digital(p.drv_dir_pins[0], Level::Low),
            self.driver.set_digital(p.drv_dir_pins[1], Level::Low),
            self.driver.change_duty_cycle(p.str_servo_pin, 0.0),
            self.driver.cleanup()
        ];

        match results.into_iter().find_map(Result::err) {
            Some(e) => Err(ActCtrlError::Shutdown(e)),
            None => Ok(())
        }
    }

    /// Set the drive state, re-sending the outputs if it changed or the last write failed.
    fn apply_drive(&mut self, target: DriveState) -> Result<(), ActCtrlError> {
        if self.released {
            return Err(ActCtrlError::Released)
        }

        let changed = target != self.drive;
        self.drive = target;

        if changed {
            debug!("Drive {:?} at {}%", target.direction, target.speed_pct);
        }

        if changed || self.drv_stale {
            self.emit_drive()
        }
        else {
            Ok(())
        }
    }

    /// Write the direction pins followed by the drive duty cycle.
    fn emit_drive(&mut self) -> Result<(), ActCtrlError> {
        let [in1, in2] = self.params.drv_dir_pins;
        let [l1, l2] = self.drive.direction.pin_levels();
        let duty = self.drive.speed_pct as f64;

        let driver = &mut self.driver;
        let pwm_pin = self.params.drv_pwm_pin;

        let res = (|| -> Result<(), HwError> {
            driver.set_digital(in1, l1)?;
            driver.set_digital(in2, l2)?;
            driver.change_duty_cycle(pwm_pin, duty)
        })();

        self.drv_stale = res.is_err();

        res.map_err(|source| ActCtrlError::Drive {
            direction: self.drive.direction,
            speed_pct: self.drive.speed_pct,
            source
        })
    }

    /// Pulse the servo to the current angle, then return the line to idle after the settle
    /// time.
    fn emit_steering(&mut self) -> Result<(), ActCtrlError> {
        let duty = servo_duty_pct(self.steering.angle_deg);
        let settle = Duration::from_millis(self.params.str_settle_ms);

        let driver = &mut self.driver;
        let pin = self.params.str_servo_pin;

        let res = (|| -> Result<(), HwError> {
            driver.change_duty_cycle(pin, duty)?;
            if !settle.is_zero() {
                thread::sleep(settle);
            }
            driver.change_duty_cycle(pin, 0.0)
        })();

        self.str_stale = res.is_err();

        res.map_err(|source| ActCtrlError::Steer {
            angle_deg: self.steering.angle_deg,
            source
        })
    }
}

impl<D: OutputDriver> Drop for ActCtrl<D> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_all() {
            warn!("Error stopping outputs on drop: {}", e);
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Servo duty cycle for an angle.
///
/// Units: percent
pub fn servo_duty_pct(angle_deg: i32) -> f64 {
    lin_map(
        (SERVO_RANGE_DEG.0 as f64, SERVO_RANGE_DEG.1 as f64),
        SERVO_DUTY_RANGE_PCT,
        angle_deg as f64
    )
}

fn moving(speed_pct: u8, direction: MotorDirection) -> DriveState {
    if speed_pct == 0 {
        DriveState::default()
    }
    else {
        DriveState { speed_pct, direction }
    }
}

fn braked(state: DriveState, step: u8) -> DriveState {
    moving(state.speed_pct.saturating_sub(step), state.direction)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::out_driver::SimDriver;

    fn test_params() -> Params {
        Params {
            str_settle_ms: 0,
            ..Params::default()
        }
    }

    fn new_ctrl() -> ActCtrl<SimDriver> {
        ActCtrl::new(SimDriver::new(), test_params()).unwrap()
    }

    fn duty(ctrl: &ActCtrl<SimDriver>, pin: u8) -> f64 {
        ctrl.driver().pin(pin).unwrap().duty
    }

    fn levels(ctrl: &ActCtrl<SimDriver>) -> [Level; 2] {
        let [a, b] = ctrl.params().drv_dir_pins;
        [ctrl.driver().pin(a).unwrap().level, ctrl.driver().pin(b).unwrap().level]
    }

    #[test]
    fn test_servo_duty() {
        assert_eq!(servo_duty_pct(0), 2.0);
        assert_eq!(servo_duty_pct(90), 7.0);
        assert_eq!(servo_duty_pct(180), 12.0);
    }

    #[test]
    fn test_init_state() {
        let ctrl = new_ctrl();
        let p = ctrl.params().clone();

        assert_eq!(ctrl.steering().angle_deg, 90);
        assert_eq!(ctrl.drive(), DriveState::default());
        assert_eq!(levels(&ctrl), [Level::Low, Level::Low]);

        // Servo line is left idle after centring
        let servo = ctrl.driver().pin(p.str_servo_pin).unwrap();
        assert!(servo.running);
        assert_eq!(servo.duty, 0.0);
        assert_eq!(servo.mode, PinMode::Pwm { frequency_hz: 50.0 });
        assert_eq!(
            ctrl.driver().pin(p.drv_pwm_pin).unwrap().mode,
            PinMode::Pwm { frequency_hz: 1000.0 }
        );
    }

    #[test]
    fn test_init_rejects_invalid_params() {
        let params = Params { str_step_deg: 0, ..test_params() };
        assert!(matches!(
            ActCtrl::new(SimDriver::new(), params),
            Err(InitError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_init_hw_failure() {
        let mut drv = SimDriver::new();
        drv.fail_next(1);
        assert!(matches!(ActCtrl::new(drv, test_params()), Err(InitError::Hw(_))));
    }

    #[test]
    fn test_steer_left_clamps_at_min() {
        let mut ctrl = new_ctrl();
        let mut angles = vec![];

        for _ in 0..3 {
            ctrl.steer(SteerDirection::Left).unwrap();
            angles.push(ctrl.steering().angle_deg);
        }

        assert_eq!(angles, vec![60, 30, 30]);
    }

    #[test]
    fn test_steer_stays_in_bounds() {
        let mut ctrl = new_ctrl();
        let seq = [
            SteerDirection::Right, SteerDirection::Right, SteerDirection::Right,
            SteerDirection::Right, SteerDirection::Left, SteerDirection::Right,
            SteerDirection::Left, SteerDirection::Left, SteerDirection::Left,
            SteerDirection::Left, SteerDirection::Left, SteerDirection::Left,
        ];

        let mut prev = ctrl.steering().angle_deg;
        for dir in seq.iter() {
            ctrl.steer(*dir).unwrap();
            let angle = ctrl.steering().angle_deg;
            assert!((30..=150).contains(&angle));

            if *dir == SteerDirection::Left {
                assert!(angle < prev || angle == 30);
            }
            prev = angle;
        }
    }

    #[test]
    fn test_steer_all_sequences_in_bounds() {
        const LEN: u32 = 8;

        for bits in 0..(1u32 << LEN) {
            let mut ctrl = new_ctrl();
            let mut prev = ctrl.steering().angle_deg;

            for i in 0..LEN {
                let dir = match bits >> i & 1 {
                    0 => SteerDirection::Left,
                    _ => SteerDirection::Right
                };
                ctrl.steer(dir).unwrap();
                let angle = ctrl.steering().angle_deg;

                assert!((30..=150).contains(&angle), "sequence {:08b} left {}", bits, angle);
                match dir {
                    SteerDirection::Left => assert!(angle < prev || angle == 30),
                    SteerDirection::Right => assert!(angle > prev || angle == 150)
                }
                prev = angle;
            }
        }
    }

    #[test]
    fn test_drive_all_sequences_consistent() {
        const LEN: u32 = 7;

        for n in 0..3u32.pow(LEN) {
            let mut ctrl = new_ctrl();
            let mut code = n;

            for _ in 0..LEN {
                let before = ctrl.drive();
                match code % 3 {
                    0 => ctrl.accelerate(Throttle::Forward).unwrap(),
                    1 => ctrl.accelerate(Throttle::Backward).unwrap(),
                    _ => {
                        ctrl.decelerate().unwrap();
                        let d = ctrl.drive();
                        assert!(d.speed_pct <= before.speed_pct);
                        if d.speed_pct > 0 {
                            assert_eq!(d.direction, before.direction);
                        }
                    }
                }
                code /= 3;

                let d = ctrl.drive();
                assert!(d.speed_pct <= 75);
                assert_eq!(d.speed_pct == 0, d.direction == MotorDirection::Stopped);
                assert_eq!(levels(&ctrl), d.direction.pin_levels());
                assert_eq!(duty(&ctrl, ctrl.params().drv_pwm_pin), d.speed_pct as f64);
            }
        }
    }

    #[test]
    fn test_steer_at_limit_is_noop() {
        let mut ctrl = new_ctrl();
        let pin = ctrl.params().str_servo_pin;

        ctrl.steer(SteerDirection::Right).unwrap();
        ctrl.steer(SteerDirection::Right).unwrap();
        let writes = ctrl.driver().pin(pin).unwrap().writes;

        ctrl.steer(SteerDirection::Right).unwrap();
        assert_eq!(ctrl.steering().angle_deg, 150);
        assert_eq!(ctrl.driver().pin(pin).unwrap().writes, writes);
    }

    #[test]
    fn test_accelerate_ramp() {
        let mut ctrl = new_ctrl();
        let mut speeds = vec![];

        for _ in 0..5 {
            ctrl.accelerate(Throttle::Forward).unwrap();
            speeds.push(ctrl.drive().speed_pct);
        }

        assert_eq!(speeds, vec![5, 10, 15, 20, 25]);
        assert_eq!(ctrl.drive().direction, MotorDirection::Forward);
        assert_eq!(levels(&ctrl), [Level::High, Level::Low]);
        assert_eq!(duty(&ctrl, ctrl.params().drv_pwm_pin), 25.0);
    }

    #[test]
    fn test_accelerate_clamps_at_max() {
        let mut ctrl = new_ctrl();

        for _ in 0..20 {
            ctrl.accelerate(Throttle::Backward).unwrap();
        }

        assert_eq!(ctrl.drive().speed_pct, 75);
        assert_eq!(ctrl.drive().direction, MotorDirection::Backward);
        assert_eq!(levels(&ctrl), [Level::Low, Level::High]);

        ctrl.accelerate(Throttle::Backward).unwrap();
        assert_eq!(ctrl.drive().speed_pct, 75);
    }

    #[test]
    fn test_accelerate_against_motion_reverses() {
        let mut ctrl = new_ctrl();
        for _ in 0..10 {
            ctrl.accelerate(Throttle::Forward).unwrap();
        }
        assert_eq!(ctrl.drive(), DriveState { speed_pct: 50, direction: MotorDirection::Forward });

        ctrl.accelerate(Throttle::Backward).unwrap();
        assert_eq!(ctrl.drive(), DriveState { speed_pct: 55, direction: MotorDirection::Backward });
        assert_eq!(levels(&ctrl), [Level::Low, Level::High]);
        assert_eq!(duty(&ctrl, ctrl.params().drv_pwm_pin), 55.0);
    }

    #[test]
    fn test_decelerate_keeps_direction() {
        let mut ctrl = new_ctrl();
        for _ in 0..3 {
            ctrl.accelerate(Throttle::Backward).unwrap();
        }

        let mut prev = ctrl.drive().speed_pct;
        while ctrl.drive().speed_pct > 0 {
            ctrl.decelerate().unwrap();
            let d = ctrl.drive();
            assert!(d.speed_pct < prev);
            if d.speed_pct > 0 {
                assert_eq!(d.direction, MotorDirection::Backward);
            }
            prev = d.speed_pct;
        }

        assert_eq!(ctrl.drive().direction, MotorDirection::Stopped);
        assert_eq!(levels(&ctrl), [Level::Low, Level::Low]);

        // Holds at stopped
        ctrl.decelerate().unwrap();
        assert_eq!(ctrl.drive(), DriveState::default());
    }

    #[test]
    fn test_cruise_clamped() {
        let mut ctrl = new_ctrl();
        ctrl.cruise(Throttle::Forward, 90).unwrap();
        assert_eq!(ctrl.drive(), DriveState { speed_pct: 75, direction: MotorDirection::Forward });

        ctrl.cruise(Throttle::Forward, 0).unwrap();
        assert_eq!(ctrl.drive(), DriveState::default());
    }

    #[test]
    fn test_failed_write_updates_state_and_retries() {
        let mut ctrl = new_ctrl();
        ctrl.driver.fail_next(1);

        let res = ctrl.accelerate(Throttle::Forward);
        assert!(matches!(res, Err(ActCtrlError::Drive { speed_pct: 5, .. })));
        assert_eq!(ctrl.drive().speed_pct, 5);
        assert_eq!(levels(&ctrl), [Level::Low, Level::Low]);

        // At max the state doesn't change, but the stale output is re-sent
        ctrl.params.drv_max_speed_pct = 5;
        ctrl.accelerate(Throttle::Forward).unwrap();
        assert_eq!(ctrl.drive().speed_pct, 5);
        assert_eq!(levels(&ctrl), [Level::High, Level::Low]);
        assert_eq!(duty(&ctrl, ctrl.params().drv_pwm_pin), 5.0);
    }

    #[test]
    fn test_failed_steer_retries_at_limit() {
        let mut ctrl = new_ctrl();
        ctrl.steer(SteerDirection::Left).unwrap();

        ctrl.driver.fail_next(1);
        assert!(matches!(
            ctrl.steer(SteerDirection::Left),
            Err(ActCtrlError::Steer { angle_deg: 30, .. })
        ));

        let pin = ctrl.params().str_servo_pin;
        let writes = ctrl.driver().pin(pin).unwrap().writes;
        ctrl.steer(SteerDirection::Left).unwrap();
        assert_eq!(ctrl.driver().pin(pin).unwrap().writes, writes + 2);
    }

    #[test]
    fn test_stop_all_idempotent() {
        let mut ctrl = new_ctrl();
        for _ in 0..4 {
            ctrl.accelerate(Throttle::Forward).unwrap();
        }

        ctrl.stop_all().unwrap();
        let p = ctrl.params().clone();
        let after_one = (duty(&ctrl, p.drv_pwm_pin), duty(&ctrl, p.str_servo_pin), levels(&ctrl));

        ctrl.stop_all().unwrap();
        let after_two = (duty(&ctrl, p.drv_pwm_pin), duty(&ctrl, p.str_servo_pin), levels(&ctrl));

        assert_eq!(after_one, (0.0, 0.0, [Level::Low, Level::Low]));
        assert_eq!(after_one, after_two);
        assert_eq!(ctrl.driver().cleanup_count(), 1);
        assert!(ctrl.is_released());
        assert_eq!(ctrl.drive(), DriveState::default());
    }

    #[test]
    fn test_commands_after_stop_rejected() {
        let mut ctrl = new_ctrl();
        ctrl.stop_all().unwrap();

        assert!(matches!(ctrl.steer(SteerDirection::Left), Err(ActCtrlError::Released)));
        assert!(matches!(ctrl.accelerate(Throttle::Forward), Err(ActCtrlError::Released)));
        assert!(matches!(ctrl.decelerate(), Err(ActCtrlError::Released)));
        assert_eq!(ctrl.steering().angle_deg, 90);
    }

    #[test]
    fn test_stop_all_reports_failure_and_still_releases() {
        let mut ctrl = new_ctrl();
        ctrl.driver.fail_next(1);

        assert!(matches!(ctrl.stop_all(), Err(ActCtrlError::Shutdown(_))));
        assert!(ctrl.is_released());
        assert!(ctrl.driver().is_released());
    }
}
