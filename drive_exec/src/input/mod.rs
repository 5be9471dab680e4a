//! # Input module
//!
//! Keyboard input adapters driving [`ActCtrl`]. Both adapters use the same key map:
//!
//! | Key | Action              |
//! |-----|---------------------|
//! | `w` | accelerate forward  |
//! | `s` | accelerate backward |
//! | `a` | steer left          |
//! | `d` | steer right         |
//! | `q` | quit                |
//!
//! - [`EventInput`] acts once per key-down event.
//! - [`PollInput`] samples which keys are held once per tick, and decelerates when no drive key
//!   is held.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod held;
mod term;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use held::HeldKeys;
pub use term::TermKeys;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::act_ctrl::{ActCtrl, ActCtrlError, SteerDirection, Throttle};
use crate::out_driver::OutputDriver;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source which can be asked whether a key is currently held down.
pub trait KeyState {
    fn is_held(&self, key: Key) -> bool;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of feeding input into the controller.
#[derive(Debug, Default)]
pub struct Response {
    /// The quit key was pressed.
    pub quit: bool,

    /// Errors returned by the controller while processing the input.
    pub faults: Vec<ActCtrlError>
}

/// Adapter acting on discrete key-down events.
#[derive(Debug, Default)]
pub struct EventInput;

/// Adapter sampling the held keys on a fixed tick.
#[derive(Debug, Default)]
pub struct PollInput;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Keys the car responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Quit
}

/// A key-down or key-up event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Press(Key),
    Release(Key)
}

/// Which adapter is used to drive the car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    Event,
    Poll
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Key {
    /// Map a typed character onto a key, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::Forward),
            's' => Some(Key::Backward),
            'a' => Some(Key::Left),
            'd' => Some(Key::Right),
            'q' => Some(Key::Quit),
            _ => None
        }
    }
}

impl Response {
    fn record(&mut self, res: Result<(), ActCtrlError>) {
        if let Err(e) = res {
            self.faults.push(e);
        }
    }
}

impl EventInput {
    pub fn new() -> Self {
        Self
    }

    /// Handle a single key event.
    ///
    /// Key-up events are ignored, auto-repeated key-downs act again.
    pub fn handle<D: OutputDriver>(&mut self, ctrl: &mut ActCtrl<D>, event: KeyEvent) -> Response {
        let mut resp = Response::default();

        let key = match event {
            KeyEvent::Press(k) => k,
            KeyEvent::Release(_) => return resp
        };

        match key {
            Key::Quit => resp.quit = true,
            Key::Left => resp.record(ctrl.steer(SteerDirection::Left)),
            Key::Right => resp.record(ctrl.steer(SteerDirection::Right)),
            Key::Forward => resp.record(ctrl.accelerate(Throttle::Forward)),
            Key::Backward => resp.record(ctrl.accelerate(Throttle::Backward))
        }

        resp
    }

    /// Handle events in order, stopping at the first quit.
    pub fn handle_all<D, I>(&mut self, ctrl: &mut ActCtrl<D>, events: I) -> Response
    where
        D: OutputDriver,
        I: IntoIterator<Item = KeyEvent>
    {
        let mut resp = Response::default();

        for event in events {
            let r = self.handle(ctrl, event);
            resp.faults.extend(r.faults);

            if r.quit {
                resp.quit = true;
                break
            }
        }

        resp
    }
}

impl PollInput {
    pub fn new() -> Self {
        Self
    }

    /// Run one control tick against the currently held keys.
    ///
    /// Forward takes priority over backward and left over right when both of a pair are held.
    pub fn tick<D, K>(&mut self, ctrl: &mut ActCtrl<D>, keys: &K) -> Response
    where
        D: OutputDriver,
        K: KeyState + ?Sized
    {
        let mut resp = Response::default();

        if keys.is_held(Key::Forward) {
            resp.record(ctrl.accelerate(Throttle::Forward));
        }
        else if keys.is_held(Key::Backward) {
            resp.record(ctrl.accelerate(Throttle::Backward));
        }
        else {
            resp.record(ctrl.decelerate());
        }

        if keys.is_held(Key::Left) {
            resp.record(ctrl.steer(SteerDirection::Left));
        }
        else if keys.is_held(Key::Right) {
            resp.record(ctrl.steer(SteerDirection::Right));
        }

        resp.quit = keys.is_held(Key::Quit);

        resp
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
