//! Preview generations
//!
//! Every assembly started for the on-screen preview gets a generation number.
//! Only the newest generation may replace the preview; results that finish
//! after a newer request was started are dropped.

/// Tracks which assembly result may be shown
#[derive(Debug, Clone, Default)]
pub struct PreviewTracker {
    issued: u64,
    shown: Option<u64>,
}

impl PreviewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request and return its generation
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Check whether a generation is still the newest request
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.issued
    }

    /// Record that a generation finished
    ///
    /// Returns `true` if its result should replace the preview.
    pub fn accept(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) || self.shown == Some(generation) {
            log::warn!(
                "Dropping stale preview generation {} (latest is {})",
                generation,
                self.issued
            );
            return false;
        }

        self.shown = Some(generation);
        true
    }

    /// Generation currently on screen
    pub fn shown(&self) -> Option<u64> {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_in_order_results_are_accepted() {
        let mut tracker = PreviewTracker::new();
        let first = tracker.begin();
        assert!(tracker.accept(first));
        let second = tracker.begin();
        assert!(tracker.accept(second));
        assert_eq!(tracker.shown(), Some(second));
    }

    #[test]
    fn test_superseded_result_is_dropped() {
        let mut tracker = PreviewTracker::new();
        let first = tracker.begin();
        let second = tracker.begin();

        // The newer request finishes first
        assert!(tracker.accept(second));
        assert!(!tracker.accept(first));
        assert_eq!(tracker.shown(), Some(second));
    }

    #[test]
    fn test_same_generation_accepted_once() {
        let mut tracker = PreviewTracker::new();
        let generation = tracker.begin();
        assert!(tracker.accept(generation));
        assert!(!tracker.accept(generation));
    }

    #[test]
    fn test_unknown_generation() {
        let mut tracker = PreviewTracker::new();
        assert!(!tracker.accept(0));
        assert!(!tracker.accept(5));
        assert_eq!(tracker.shown(), None);
    }
}
