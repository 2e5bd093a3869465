//! Nullable clock.

use stakegov_types::Timestamp;
use std::cell::Cell;

/// Time only advances when you tell it to.
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}

impl Default for NullClock {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_request() {
        let clock = NullClock::new(1_000);
        assert_eq!(clock.now(), Timestamp::new(1_000));
        clock.advance(60);
        assert_eq!(clock.now().as_secs(), 1_060);
        clock.set(5);
        assert_eq!(clock.now().as_secs(), 5);
    }
}
