// Host-neutral input snapshot.
//
// The host polls whatever keyboard it has and reports, once per frame, which
// of the twelve keys the explorer understands are held down. `InputState` is
// that snapshot as a 16-bit set. `InputTracker` keeps the previous frame so
// the explorer can act on key-down and key-up edges without the host having
// to deliver discrete events.
//
// See also: `explorer.rs`, the only consumer.

use serde::{Deserialize, Serialize};

/// Keys the explorer responds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    I,
    J,
    K,
    L,
    Escape,
    Enter,
    Space,
    Tab,
}

impl Key {
    pub const ALL: [Key; 12] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::I,
        Key::J,
        Key::K,
        Key::L,
        Key::Escape,
        Key::Enter,
        Key::Space,
        Key::Tab,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Which keys are held during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputState {
    held: u16,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with exactly `keys` held.
    pub fn with_keys(keys: &[Key]) -> Self {
        let mut state = Self::new();
        for &key in keys {
            state.press(key);
        }
        state
    }

    pub fn press(&mut self, key: Key) {
        self.held |= key.bit();
    }

    pub fn release(&mut self, key: Key) {
        self.held &= !key.bit();
    }

    pub fn held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.held == 0
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        Key::ALL.into_iter().filter(|&k| self.held(k))
    }
}

/// Current and previous frame, for edge detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputTracker {
    previous: InputState,
    current: InputState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame with `state` as the held set.
    pub fn advance(&mut self, state: InputState) {
        self.previous = self.current;
        self.current = state;
    }

    pub fn current(&self) -> InputState {
        self.current
    }

    pub fn held(&self, key: Key) -> bool {
        self.current.held(key)
    }

    /// Held this frame but not the last.
    pub fn just_pressed(&self, key: Key) -> bool {
        self.current.held(key) && !self.previous.held(key)
    }

    /// Held last frame but not this one.
    pub fn just_released(&self, key: Key) -> bool {
        !self.current.held(key) && self.previous.held(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_have_distinct_bits() {
        let mut all = 0u16;
        for key in Key::ALL {
            assert_eq!(all & key.bit(), 0, "{key:?} shares a bit");
            all |= key.bit();
        }
    }

    #[test]
    fn press_and_release() {
        let mut state = InputState::new();
        assert!(state.is_empty());
        state.press(Key::Space);
        state.press(Key::W);
        assert!(state.held(Key::Space));
        assert!(state.held(Key::W));
        assert!(!state.held(Key::Tab));
        state.release(Key::W);
        assert!(!state.held(Key::W));
        assert_eq!(state.keys().collect::<Vec<_>>(), vec![Key::Space]);
    }

    #[test]
    fn tracker_reports_edges() {
        let mut tracker = InputTracker::new();
        tracker.advance(InputState::with_keys(&[Key::Enter]));
        assert!(tracker.just_pressed(Key::Enter));
        assert!(!tracker.just_released(Key::Enter));

        tracker.advance(InputState::with_keys(&[Key::Enter]));
        assert!(tracker.held(Key::Enter));
        assert!(!tracker.just_pressed(Key::Enter));

        tracker.advance(InputState::new());
        assert!(tracker.just_released(Key::Enter));
        assert!(!tracker.held(Key::Enter));

        tracker.advance(InputState::new());
        assert!(!tracker.just_released(Key::Enter));
    }

    #[test]
    fn input_state_serializes() {
        let state = InputState::with_keys(&[Key::I, Key::Tab]);
        let json = serde_json::to_string(&state).unwrap();
        let restored: InputState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, restored);
    }
}
