//! Held key tracking with a release timeout

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::{Key, KeyEvent, KeyState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Set of keys currently held down.
///
/// Terminals often only report key-down events, repeating them while the key is held, and even
/// those that report releases can drop one. A key is considered released once no key-down has
/// been seen for `hold_timeout`, which must be longer than the terminal's initial key repeat
/// delay.
#[derive(Debug)]
pub struct HeldKeys {
    hold_timeout: Duration,

    last_seen: HashMap<Key, Instant>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeldKeys {
    pub fn new(hold_timeout: Duration) -> Self {
        Self {
            hold_timeout,
            last_seen: HashMap::new()
        }
    }

    /// Record an event seen at `now`.
    pub fn update(&mut self, event: KeyEvent, now: Instant) {
        match event {
            KeyEvent::Press(k) => {
                self.last_seen.insert(k, now);
            },
            KeyEvent::Release(k) => {
                self.last_seen.remove(&k);
            }
        }
    }

    /// Release every key whose last key-down is older than the hold timeout, returning the
    /// release events.
    pub fn expire(&mut self, now: Instant) -> Vec<KeyEvent> {
        let timeout = self.hold_timeout;
        let mut expired: Vec<Key> = self.last_seen
            .iter()
            .filter(|&(_, &t)| now.saturating_duration_since(t) >= timeout)
            .map(|(&k, _)| k)
            .collect();

        // HashMap order isn't stable
        expired.sort_by_key(|k| *k as u8);

        for k in expired.iter() {
            self.last_seen.remove(k);
        }

        expired.into_iter().map(KeyEvent::Release).collect()
    }
}

impl KeyState for HeldKeys {
    fn is_held(&self, key: Key) -> bool {
        self.last_seen.contains_key(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut keys = HeldKeys::new(Duration::from_millis(500));
        let t0 = Instant::now();

        keys.update(KeyEvent::Press(Key::Forward), t0);
        assert!(keys.is_held(Key::Forward));
        assert!(!keys.is_held(Key::Left));

        keys.update(KeyEvent::Release(Key::Forward), t0);
        assert!(!keys.is_held(Key::Forward));
    }

    #[test]
    fn test_expiry() {
        let mut keys = HeldKeys::new(Duration::from_millis(500));
        let t0 = Instant::now();

        keys.update(KeyEvent::Press(Key::Left), t0);
        keys.update(KeyEvent::Press(Key::Forward), t0);

        // A repeat keeps the key held
        keys.update(KeyEvent::Press(Key::Forward), t0 + Duration::from_millis(400));

        let released = keys.expire(t0 + Duration::from_millis(600));
        assert_eq!(released, vec![KeyEvent::Release(Key::Left)]);
        assert!(keys.is_held(Key::Forward));

        let released = keys.expire(t0 + Duration::from_millis(900));
        assert_eq!(released, vec![KeyEvent::Release(Key::Forward)]);
        assert!(keys.expire(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_missing_release_expires() {
        let mut keys = HeldKeys::new(Duration::from_millis(750));
        let t0 = Instant::now();

        keys.update(KeyEvent::Press(Key::Forward), t0);
        assert!(keys.expire(t0 + Duration::from_millis(700)).is_empty());

        // No repeat and no release
        let released = keys.expire(t0 + Duration::from_millis(800));
        assert_eq!(released, vec![KeyEvent::Release(Key::Forward)]);
        assert!(!keys.is_held(Key::Forward));

        // A late release for an expired key is harmless
        keys.update(KeyEvent::Release(Key::Forward), t0 + Duration::from_secs(2));
        assert!(!keys.is_held(Key::Forward));
    }
}
