//! Session high score for the runner game
//!
//! Lives for the lifetime of the page: created once by the host, cloned into
//! every game instance, never written to storage.

use std::cell::Cell;
use std::rc::Rc;

/// Shared best-score context.
///
/// Clones share the same value. Access is single-threaded (frame callbacks
/// only), so a `Cell` is enough.
#[derive(Debug, Clone, Default)]
pub struct SessionScores {
    best: Rc<Cell<f64>>,
}

impl SessionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best score seen this session
    pub fn best(&self) -> f64 {
        self.best.get()
    }

    /// Offer a score; returns true if it became the new best
    pub fn record(&self, score: f64) -> bool {
        if score > self.best.get() {
            self.best.set(score);
            true
        } else {
            false
        }
    }

    /// Best score as shown in the HUD (whole points)
    pub fn display_best(&self) -> u64 {
        self.best.get().floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_maximum() {
        let scores = SessionScores::new();
        assert!(scores.record(12.5));
        assert!(!scores.record(3.0));
        assert!(scores.record(40.2));
        assert_eq!(scores.best(), 40.2);
        assert_eq!(scores.display_best(), 40);
    }

    #[test]
    fn test_clones_share_state() {
        let a = SessionScores::new();
        let b = a.clone();
        b.record(9.0);
        assert_eq!(a.best(), 9.0);
    }
}
