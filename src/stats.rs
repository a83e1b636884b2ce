//! Accumulation of veto decision statistics across events

/// Counters of how many events each veto reason rejected
///
/// The caller owns one of these and passes it into every decision; there is
/// no hidden global state. A host that processes events on several workers
/// keeps one accumulator per worker and merges them once event processing
/// has quiesced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VetoStatistics {
    /// Events vetoed by both the final-state and the initial-state condition
    pub both_vetoes: u64,

    /// Events vetoed by the final-state condition alone
    pub final_state_vetoes: u64,

    /// Events vetoed by the initial-state condition alone
    pub initial_state_vetoes: u64,
}
//
impl VetoStatistics {
    /// Start counting from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the sub-verdicts of one decision
    ///
    /// Both sub-verdicts are recorded even when only one drives the final
    /// decision; nothing is counted when neither fires.
    pub(crate) fn record(&mut self, final_state_veto: bool, initial_state_veto: bool) {
        match (final_state_veto, initial_state_veto) {
            (true, true) => self.both_vetoes += 1,
            (true, false) => self.final_state_vetoes += 1,
            (false, true) => self.initial_state_vetoes += 1,
            (false, false) => {}
        }
    }

    /// Total number of vetoed events
    pub fn total_vetoes(&self) -> u64 {
        self.both_vetoes + self.final_state_vetoes + self.initial_state_vetoes
    }

    /// Fold another accumulator into this one
    ///
    /// This is how a concurrent host combines its per-worker accumulators;
    /// the sequential driver never needs it.
    #[allow(dead_code)]
    pub fn merge(&mut self, other: &VetoStatistics) {
        self.both_vetoes += other.both_vetoes;
        self.final_state_vetoes += other.final_state_vetoes;
        self.initial_state_vetoes += other.initial_state_vetoes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_reason_feeds_its_own_counter() {
        let mut stats = VetoStatistics::new();
        stats.record(false, false);
        assert_eq!(stats.total_vetoes(), 0);
        stats.record(true, false);
        stats.record(false, true);
        stats.record(true, true);
        assert_eq!(stats.final_state_vetoes, 1);
        assert_eq!(stats.initial_state_vetoes, 1);
        assert_eq!(stats.both_vetoes, 1);
        assert_eq!(stats.total_vetoes(), 3);
    }

    #[test]
    fn merging_adds_counters() {
        let mut left = VetoStatistics::new();
        left.record(true, false);
        let mut right = VetoStatistics::new();
        right.record(true, true);
        right.record(false, true);
        left.merge(&right);
        assert_eq!(
            left,
            VetoStatistics {
                both_vetoes: 1,
                final_state_vetoes: 1,
                initial_state_vetoes: 1,
            }
        );
    }
}
