//! The cluster-history veto decision engine
//!
//! A dedicated sample already simulates configurations where extra bottom
//! quarks arise from the matrix element, so an inclusive sample must reject
//! the events whose clustering history shows the same configurations, or
//! they would be counted twice. The engine walks the snapshot chain twice,
//! once for the final state and once for the initial state, and vetoes the
//! event unless both passes clear it.

use crate::{
    classify,
    history::{ClusterHistory, Snapshot, SnapshotId, NUM_INITIAL},
    momentum::Z,
    numeric::Float,
    record::{EventRecord, VETO_TAG},
    stats::VetoStatistics,
    Result,
};

use eyre::eyre;

/// Largest leg count for which the correction weight still contributes at
/// the required order (up to 2→3 configurations)
const CORRECTION_MAX_LEGS: usize = 5;

/// Outcome of one veto decision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Verdict {
    /// Whether the event survives the veto
    pub keep: bool,

    /// Final-state sub-verdict: an unresolved collinear splitting produced
    /// the first non-decay bottom quark
    pub final_state_veto: bool,

    /// Initial-state sub-verdict: the initial-state bottom splitting was
    /// unfolded without enough intermediate emissions
    pub initial_state_veto: bool,

    /// Accumulated correction weight (zero until a model is plugged in)
    pub correction_weight: Float,
}

/// Per-leg contribution to the correction weight
///
/// The physics content of this correction is still an open question and
/// must come from a downstream module. The engine only guarantees which
/// legs are eligible and that no splitting is credited twice.
pub trait CorrectionModel {
    /// Contribution of the initial-state leg in the given slot
    fn contribution(&self, snapshot: &Snapshot, slot: usize) -> Float;
}

/// Placeholder model used until the real correction is supplied
pub struct NoCorrection;
//
impl CorrectionModel for NoCorrection {
    fn contribution(&self, _snapshot: &Snapshot, _slot: usize) -> Float {
        0.
    }
}

/// What to do with a vetoed event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VetoPolicy {
    /// Drop vetoed events from the sample
    Reject,

    /// Keep every event, tagging it with the verdict so that downstream
    /// consumers can filter on it
    Annotate,
}

/// The veto decision engine
///
/// Stateless across events: all per-event data is read from the chain and
/// all cross-event bookkeeping lives in the caller's [`VetoStatistics`].
pub struct HistoryVeto<C: CorrectionModel = NoCorrection> {
    /// Whether the sample was generated at next-to-leading order, which
    /// allows one more real emission before a configuration is suspicious
    nlo: bool,

    /// Correction weight model
    correction: C,
}
//
impl HistoryVeto {
    /// Set up the engine with the placeholder correction model
    pub fn new(nlo: bool) -> Self {
        Self {
            nlo,
            correction: NoCorrection,
        }
    }
}
//
impl<C: CorrectionModel> HistoryVeto<C> {
    /// Set up the engine with a custom correction model
    #[allow(dead_code)]
    pub fn with_correction(nlo: bool, correction: C) -> Self {
        Self { nlo, correction }
    }

    /// Decide whether the event owning this cluster history must be vetoed
    pub fn decide(&self, history: &ClusterHistory, stats: &mut VetoStatistics) -> Verdict {
        let final_state_veto = self.final_state_pass(history);
        let (initial_state_veto, initial_hit) = self.initial_state_pass(history);

        stats.record(final_state_veto, initial_state_veto);

        // The correction only applies to configurations the initial-state
        // condition flagged; everywhere else it would be of higher order
        let correction_weight = match initial_hit {
            Some(hit) if initial_state_veto => self.correction_weight(history, hit),
            _ => 0.,
        };

        Verdict {
            keep: !(final_state_veto || initial_state_veto),
            final_state_veto,
            initial_state_veto,
            correction_weight,
        }
    }

    /// Final-state pass: find the first snapshot showing a non-decay bottom
    /// quark in its final state and ask whether the configuration one step
    /// harder already had enough jet activity
    fn final_state_pass(&self, history: &ClusterHistory) -> bool {
        let mut cursor = Some(history.root());
        while let Some(id) = cursor {
            if classify::find_first_nondecay_bottom(history.snapshot(id)).is_some() {
                let prev = history.prev(id).map(|prev| history.snapshot(prev));
                return !self.final_state_sufficient(prev);
            }
            cursor = history.next(id);
        }
        // No bottom quark anywhere in the chain: nothing to double-count
        false
    }

    /// Initial-state pass: find the first snapshot carrying a non-decay
    /// bottom quark in its initial state and check the unfolding condition
    ///
    /// Also reports where the bottom first appeared, which is where the
    /// correction-weight walk starts.
    fn initial_state_pass(&self, history: &ClusterHistory) -> (bool, Option<SnapshotId>) {
        let mut cursor = Some(history.root());
        while let Some(id) = cursor {
            if classify::count_initial_state_bottoms(history.snapshot(id)) != 0 {
                return (!self.initial_state_sufficient(history, id), Some(id));
            }
            cursor = history.next(id);
        }
        (false, None)
    }

    /// Truth that a snapshot's final state carries enough light partons to
    /// be a genuine higher-multiplicity configuration rather than an
    /// unresolved collinear split
    fn final_state_sufficient(&self, snapshot: Option<&Snapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        let (num_quarks, num_gluons) = classify::count_light_final_state(snapshot);
        if self.nlo {
            num_quarks >= 2 || num_quarks + num_gluons > 2
        } else {
            num_quarks >= 1 || num_gluons > 1
        }
    }

    /// Truth that enough shower emissions happen before the initial-state
    /// bottom splitting of this snapshot is unfolded
    ///
    /// `start` must already be known to carry a non-decay initial-state
    /// bottom quark.
    fn initial_state_sufficient(&self, history: &ClusterHistory, start: SnapshotId) -> bool {
        // Nothing further to unfold at the end of the chain
        if history.next(start).is_none() {
            return true;
        }

        // A configuration that was already jetty one step harder cannot be
        // an artifact of the unresolved splitting
        if let Some(prev) = history.prev(start) {
            if self.final_state_sufficient(Some(history.snapshot(prev))) {
                return true;
            }
        }

        // Count intermediate emissions until the splitting is unfolded.
        // Steps that change the non-QCD final-state multiplicity are decay
        // boundaries, not emissions.
        let allowed_emissions = if self.nlo { 1 } else { 0 };
        let mut num_emissions = 0;
        let mut prev_bottoms = classify::count_initial_state_bottoms(history.snapshot(start));
        let mut prev_non_qcd = classify::count_non_qcd_final_state(history.snapshot(start));
        let mut cursor = start;
        while let Some(id) = history.next(cursor) {
            cursor = id;
            let snapshot = history.snapshot(id);
            let num_bottoms = classify::count_initial_state_bottoms(snapshot);
            let num_non_qcd = classify::count_non_qcd_final_state(snapshot);
            let decay = num_non_qcd != prev_non_qcd;
            if num_bottoms >= prev_bottoms && !decay {
                num_emissions += 1;
            }
            if num_emissions > allowed_emissions {
                return true;
            }
            // Splitting fully unfolded before enough emissions happened
            if num_bottoms == 0 {
                break;
            }
            prev_bottoms = num_bottoms;
            prev_non_qcd = num_non_qcd;
        }
        false
    }

    /// Accumulate the correction weight along the chain, starting where the
    /// initial-state bottom quark first appeared
    ///
    /// Two bookkeeping slots remember the signed longitudinal momentum of
    /// the last credited leg, so that adjacent snapshots presenting the
    /// same physical bottom leg (same slot, same momentum sign) contribute
    /// at most once.
    fn correction_weight(&self, history: &ClusterHistory, start: SnapshotId) -> Float {
        let mut weight = 0.;
        let mut bookkeep = [0.; NUM_INITIAL];
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let snapshot = history.snapshot(id);
            if snapshot.legs().len() > CORRECTION_MAX_LEGS {
                break;
            }
            for slot in 0..NUM_INITIAL {
                let leg = &snapshot.legs()[slot];
                if !leg.flavor.is_bottom() {
                    continue;
                }
                let pz = leg.momentum[Z];
                // A credited leg of the same momentum sign in either slot
                // means this splitting has already been counted
                if bookkeep.iter().any(|&credited| credited * pz > 0.) {
                    continue;
                }
                weight += self.correction.contribution(snapshot, slot);
                bookkeep[slot] = pz;
            }
            cursor = history.next(id);
        }
        weight
    }
}

/// Run the veto on one event record and apply the given policy
///
/// Returns whether the event stays in the sample. An event record without
/// a cluster history comes from a production mode this algorithm cannot
/// judge, so it is a hard error rather than a default verdict, and the
/// statistics are left untouched.
pub fn process_event<C: CorrectionModel>(
    engine: &HistoryVeto<C>,
    record: &mut EventRecord,
    policy: VetoPolicy,
    stats: &mut VetoStatistics,
) -> Result<bool> {
    let history = record.cluster_history().ok_or_else(|| {
        eyre!("No cluster history attached to the event record, this algorithm requires one")
    })?;
    let verdict = engine.decide(history, stats);
    Ok(match policy {
        VetoPolicy::Reject => verdict.keep,
        VetoPolicy::Annotate => {
            record.set_tag(VETO_TAG, i32::from(!verdict.keep));
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{testing::*, Leg};
    use std::cell::Cell;

    fn decide(nlo: bool, snapshots: Vec<Vec<Leg>>) -> (Verdict, VetoStatistics) {
        let mut stats = VetoStatistics::new();
        let verdict = HistoryVeto::new(nlo).decide(&history(snapshots), &mut stats);
        (verdict, stats)
    }

    /// Final state of `num_quarks` light quarks and `num_gluons` gluons on
    /// top of a gluon-gluon initial state
    fn light_snapshot(num_quarks: usize, num_gluons: usize) -> Vec<Leg> {
        let mut legs = vec![leg(21), leg(21)];
        legs.extend((0..num_quarks).map(|flavor| leg(flavor as i32 % 4 + 1)));
        legs.extend((0..num_gluons).map(|_| leg(21)));
        legs
    }

    #[test]
    fn chains_without_bottoms_are_kept_silently() {
        // Scenario A: two light initial-state legs, three light final-state
        // legs, nothing else
        let (verdict, stats) = decide(true, vec![vec![leg(1), leg(-1), leg(2), leg(-2), leg(21)]]);
        assert!(verdict.keep);
        assert!(!verdict.final_state_veto);
        assert!(!verdict.initial_state_veto);
        assert_eq!(stats, VetoStatistics::new());
    }

    #[test]
    fn jetty_predecessor_clears_the_final_state_pass() {
        // Scenario B: the bottom appears one step after a three-quark
        // configuration, which NLO mode considers sufficient
        let (verdict, stats) = decide(
            true,
            vec![
                vec![leg(21), leg(21), leg(1), leg(-2), leg(3)],
                vec![leg(21), leg(21), leg(5), leg(1), leg(-2), leg(3)],
            ],
        );
        assert!(!verdict.final_state_veto);
        assert!(verdict.keep);
        assert_eq!(stats, VetoStatistics::new());
    }

    #[test]
    fn bare_predecessor_triggers_the_final_state_veto() {
        // Scenario C: same shape, but the predecessor only has one quark
        let (verdict, stats) = decide(
            true,
            vec![
                vec![leg(21), leg(21), leg(1)],
                vec![leg(21), leg(21), leg(5), leg(1)],
            ],
        );
        assert!(verdict.final_state_veto);
        assert!(!verdict.initial_state_veto);
        assert!(!verdict.keep);
        assert_eq!(stats.final_state_vetoes, 1);
        assert_eq!(stats.total_vetoes(), 1);
    }

    #[test]
    fn bottom_at_the_chain_root_has_no_predecessor_to_excuse_it() {
        let (verdict, _) = decide(true, vec![vec![leg(21), leg(21), leg(5), leg(1), leg(-2)]]);
        assert!(verdict.final_state_veto);
        assert!(!verdict.keep);
    }

    #[test]
    fn chain_end_leaves_nothing_to_unfold() {
        // Scenario D: the initial-state bottom only shows up in the last
        // snapshot of the chain
        let (verdict, stats) = decide(
            true,
            vec![
                vec![leg(21), leg(21), leg(1)],
                vec![leg(21), leg(21), leg(1), leg(21)],
                vec![leg(5), leg(21), leg(1)],
            ],
        );
        assert!(!verdict.initial_state_veto);
        assert!(verdict.keep);
        assert_eq!(stats, VetoStatistics::new());
    }

    #[test]
    fn jetty_predecessor_clears_the_initial_state_pass() {
        // Scenario E: the snapshot holding the initial-state bottom sits
        // right after a sufficient configuration, so the emission walk is
        // never entered even though it would fail here
        let (verdict, _) = decide(
            true,
            vec![
                vec![leg(21), leg(21), leg(1), leg(-2), leg(3)],
                vec![leg(5), leg(21), leg(1), leg(-2), leg(3)],
                vec![leg(21), leg(21), leg(1), leg(-2), leg(3)],
            ],
        );
        assert!(!verdict.initial_state_veto);
    }

    #[test]
    fn unfolding_without_emissions_triggers_the_initial_state_veto() {
        // The initial-state bottom disappears on the very next step and no
        // final-state bottom shows up to trigger the other pass
        let (verdict, stats) = decide(
            true,
            vec![
                vec![leg(5), leg(21), leg(1)],
                vec![leg(21), leg(21), leg(1), decay_leg(5)],
            ],
        );
        assert!(!verdict.final_state_veto);
        assert!(verdict.initial_state_veto);
        assert!(!verdict.keep);
        assert_eq!(stats.initial_state_vetoes, 1);
        assert_eq!(stats.total_vetoes(), 1);
    }

    #[test]
    fn enough_emissions_clear_the_initial_state_pass() {
        // Two emissions before the chain ends, above the NLO threshold
        let (verdict, _) = decide(
            true,
            vec![
                vec![leg(5), leg(21), leg(1)],
                vec![leg(5), leg(21), leg(1), leg(21)],
                vec![leg(5), leg(21), leg(1), leg(21), leg(21)],
            ],
        );
        assert!(!verdict.initial_state_veto);
    }

    #[test]
    fn nlo_mode_requires_one_more_emission_than_leading_order() {
        // One emission, then the chain ends with the bottom still folded
        let chain = || {
            vec![
                vec![leg(5), leg(21), leg(1)],
                vec![leg(5), leg(21), leg(1), leg(21)],
            ]
        };
        let (verdict_lo, _) = decide(false, chain());
        assert!(!verdict_lo.initial_state_veto);
        let (verdict_nlo, _) = decide(true, chain());
        assert!(verdict_nlo.initial_state_veto);
    }

    #[test]
    fn decay_boundaries_do_not_count_as_emissions() {
        // The extra final-state leg on the middle step is a lepton, so the
        // non-QCD multiplicity changes and the step must not be counted
        let (verdict, _) = decide(
            false,
            vec![
                vec![leg(5), leg(21), leg(1)],
                vec![leg(5), leg(21), leg(1), leg(11)],
            ],
        );
        assert!(verdict.initial_state_veto);
    }

    #[test]
    fn final_state_condition_is_monotonic_in_quark_count() {
        let engine = HistoryVeto::new(true);
        for num_gluons in 0..5 {
            for num_quarks in 0..5 {
                let below = history(vec![light_snapshot(num_quarks, num_gluons)]);
                let above = history(vec![light_snapshot(num_quarks + 1, num_gluons)]);
                let sufficient_below =
                    engine.final_state_sufficient(Some(below.snapshot(below.root())));
                let sufficient_above =
                    engine.final_state_sufficient(Some(above.snapshot(above.root())));
                assert!(
                    sufficient_above || !sufficient_below,
                    "Adding a quark flipped ({}, {}) back to insufficient",
                    num_quarks,
                    num_gluons
                );
            }
        }
    }

    #[test]
    fn decisions_are_idempotent() {
        let chain = history(vec![
            vec![leg(21), leg(21), leg(1)],
            vec![leg(21), leg(21), leg(5), leg(1)],
        ]);
        let engine = HistoryVeto::new(true);
        let mut stats = VetoStatistics::new();
        let first = engine.decide(&chain, &mut stats);
        let second = engine.decide(&chain, &mut stats);
        assert_eq!(first, second);
        // Statistics accumulate, one increment per call
        assert_eq!(stats.final_state_vetoes, 2);
    }

    /// Correction model that counts how often it is invoked
    struct CountingCorrection(Cell<usize>);
    //
    impl CorrectionModel for CountingCorrection {
        fn contribution(&self, _snapshot: &Snapshot, _slot: usize) -> Float {
            self.0.set(self.0.get() + 1);
            1.
        }
    }

    #[test]
    fn correction_credits_each_splitting_once() {
        // The same physical bottom leg shows up in slot 0 of two adjacent
        // snapshots with the same momentum sign; only the first may count
        let engine = HistoryVeto::with_correction(true, CountingCorrection(Cell::new(0)));
        let mut stats = VetoStatistics::new();
        let chain = history(vec![
            vec![leg_pz(5, 100.), leg(21), leg(1)],
            vec![leg_pz(5, 90.), leg(21), leg(1), leg(21)],
        ]);
        let verdict = engine.decide(&chain, &mut stats);
        assert!(verdict.initial_state_veto);
        assert_eq!(verdict.correction_weight, 1.);
        assert_eq!(engine.correction.0.get(), 1);
    }

    #[test]
    fn correction_credits_opposite_slots_independently() {
        // A second bottom in the other slot with the opposite momentum sign
        // is a different splitting and earns its own contribution
        let engine = HistoryVeto::with_correction(true, CountingCorrection(Cell::new(0)));
        let mut stats = VetoStatistics::new();
        let chain = history(vec![
            vec![leg_pz(5, 100.), leg(21), leg(1)],
            vec![leg_pz(5, 90.), leg_pz(-5, -80.), leg(1), leg(21)],
        ]);
        let verdict = engine.decide(&chain, &mut stats);
        assert_eq!(verdict.correction_weight, 2.);
    }

    #[test]
    fn correction_walk_stops_at_large_configurations() {
        // The second snapshot is already 2→4, so its bottom is of higher
        // order and must not contribute
        let engine = HistoryVeto::with_correction(true, CountingCorrection(Cell::new(0)));
        let mut stats = VetoStatistics::new();
        let chain = history(vec![
            vec![leg_pz(5, 100.), leg(21), leg(1)],
            vec![leg_pz(-5, -90.), leg(21), leg(1), leg(21), leg(21), leg(21)],
        ]);
        let verdict = engine.decide(&chain, &mut stats);
        assert!(verdict.initial_state_veto);
        assert_eq!(verdict.correction_weight, 1.);
    }

    #[test]
    fn kept_events_get_no_correction() {
        let engine = HistoryVeto::with_correction(true, CountingCorrection(Cell::new(0)));
        let mut stats = VetoStatistics::new();
        let chain = history(vec![vec![leg(21), leg(21), leg(1), leg(-2), leg(3)]]);
        let verdict = engine.decide(&chain, &mut stats);
        assert!(verdict.keep);
        assert_eq!(verdict.correction_weight, 0.);
        assert_eq!(engine.correction.0.get(), 0);
    }

    #[test]
    fn reject_policy_discards_vetoed_events() {
        let engine = HistoryVeto::new(true);
        let mut stats = VetoStatistics::new();
        let mut record = EventRecord::new(Some(history(vec![
            vec![leg(21), leg(21), leg(1)],
            vec![leg(21), leg(21), leg(5), leg(1)],
        ])));
        let keep = process_event(&engine, &mut record, VetoPolicy::Reject, &mut stats).unwrap();
        assert!(!keep);
        assert_eq!(record.tag(VETO_TAG), None);
    }

    #[test]
    fn annotate_policy_keeps_and_tags_vetoed_events() {
        let engine = HistoryVeto::new(true);
        let mut stats = VetoStatistics::new();
        let mut record = EventRecord::new(Some(history(vec![
            vec![leg(21), leg(21), leg(1)],
            vec![leg(21), leg(21), leg(5), leg(1)],
        ])));
        let keep = process_event(&engine, &mut record, VetoPolicy::Annotate, &mut stats).unwrap();
        assert!(keep);
        assert_eq!(record.tag(VETO_TAG), Some(1));

        let mut clean = EventRecord::new(Some(history(vec![vec![leg(1), leg(-1), leg(2)]])));
        let keep = process_event(&engine, &mut clean, VetoPolicy::Annotate, &mut stats).unwrap();
        assert!(keep);
        assert_eq!(clean.tag(VETO_TAG), Some(0));
    }

    #[test]
    fn missing_cluster_history_is_a_hard_error() {
        let engine = HistoryVeto::new(true);
        let mut stats = VetoStatistics::new();
        let mut record = EventRecord::new(None);
        let result = process_event(&engine, &mut record, VetoPolicy::Reject, &mut stats);
        assert!(result.is_err());
        // The failed event must not leak into the statistics
        assert_eq!(stats, VetoStatistics::new());
    }
}
