//! Terminal keyboard source using crossterm

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags
    },
    execute,
    terminal
};
use log::{info, warn};

use super::{HeldKeys, Key, KeyEvent, KeyState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Keyboard input read from the controlling terminal.
///
/// The terminal is put into raw mode for the lifetime of this struct. Where the terminal supports
/// it key releases are reported directly. Either way a key without a recent key-down is released
/// by [`HeldKeys`].
pub struct TermKeys {
    held: HeldKeys,

    /// Whether the terminal reports key releases.
    reports_release: bool
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TermKeys {
    pub fn new(hold_timeout: Duration) -> io::Result<Self> {
        terminal::enable_raw_mode()?;

        let reports_release = match terminal::supports_keyboard_enhancement() {
            Ok(true) => {
                execute!(
                    io::stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                )?;
                true
            },
            Ok(false) => false,
            Err(e) => {
                warn!("Could not query keyboard enhancement support: {}", e);
                false
            }
        };

        info!("Keys without a key-down for {:?} are released", hold_timeout);
        if reports_release {
            info!("Terminal reports key releases");
        }
        else {
            info!("Terminal doesn't report key releases");
        }

        Ok(Self {
            held: HeldKeys::new(hold_timeout),
            reports_release
        })
    }

    /// Collect key events for up to `period`.
    ///
    /// Returns once `period` has elapsed, with every event that arrived in that time.
    pub fn poll(&mut self, period: Duration) -> io::Result<Vec<KeyEvent>> {
        let deadline = Instant::now() + period;
        let mut events = Vec::new();

        let mut wait = period;
        while event::poll(wait)? {
            if let Event::Key(k) = event::read()? {
                if let Some(e) = map_key(&k) {
                    self.held.update(e, Instant::now());
                    events.push(e);
                }
            }

            wait = deadline.saturating_duration_since(Instant::now());
        }

        // Releases can still go missing when reported, e.g. if focus leaves the terminal while
        // a key is down. Held keys keep repeating so they don't expire.
        events.extend(self.held.expire(Instant::now()));

        Ok(events)
    }
}

impl KeyState for TermKeys {
    fn is_held(&self, key: Key) -> bool {
        self.held.is_held(key)
    }
}

impl Drop for TermKeys {
    fn drop(&mut self) {
        let mut stdout = io::stdout();

        if self.reports_release {
            execute!(stdout, PopKeyboardEnhancementFlags).ok();
        }

        if let Err(e) = terminal::disable_raw_mode() {
            warn!("Could not restore the terminal: {}", e);
        }

        stdout.flush().ok();
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a terminal key event onto the car's keys. `Esc` and `Ctrl-C` quit.
fn map_key(k: &TermKeyEvent) -> Option<KeyEvent> {
    let key = match k.code {
        KeyCode::Esc => Key::Quit,
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Char(c) => Key::from_char(c)?,
        _ => return None
    };

    match k.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(KeyEvent::Press(key)),
        KeyEventKind::Release => Some(KeyEvent::Release(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn term_key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> TermKeyEvent {
        TermKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE
        }
    }

    #[test]
    fn test_map_key() {
        let none = KeyModifiers::NONE;

        assert_eq!(
            map_key(&term_key(KeyCode::Char('W'), KeyModifiers::SHIFT, KeyEventKind::Press)),
            Some(KeyEvent::Press(Key::Forward))
        );
        assert_eq!(
            map_key(&term_key(KeyCode::Char('a'), none, KeyEventKind::Repeat)),
            Some(KeyEvent::Press(Key::Left))
        );
        assert_eq!(
            map_key(&term_key(KeyCode::Char('d'), none, KeyEventKind::Release)),
            Some(KeyEvent::Release(Key::Right))
        );
        assert_eq!(
            map_key(&term_key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press)),
            Some(KeyEvent::Press(Key::Quit))
        );
        assert_eq!(map_key(&term_key(KeyCode::Esc, none, KeyEventKind::Press)),
            Some(KeyEvent::Press(Key::Quit)));
        assert_eq!(map_key(&term_key(KeyCode::Char('x'), none, KeyEventKind::Press)), None);
        assert_eq!(map_key(&term_key(KeyCode::Enter, none, KeyEventKind::Press)), None);
    }
}
