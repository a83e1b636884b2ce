//! Pure classification of a snapshot's particle content
//!
//! These functions never look at the chain links; they judge one snapshot
//! in isolation and leave the traversal decisions to the veto engine. Legs
//! flagged as coming from a hard decay belong to the decay handler, not to
//! the shower, and are excluded wherever shower activity is being counted.

use crate::history::{Snapshot, NUM_INITIAL};

/// Position of the first final-state bottom leg not from a hard decay
///
/// Scans the final-state legs in order and returns the absolute leg
/// position of the first match, or `None` if the snapshot has no such leg.
pub fn find_first_nondecay_bottom(snapshot: &Snapshot) -> Option<usize> {
    snapshot
        .legs()
        .iter()
        .enumerate()
        .skip(NUM_INITIAL)
        .find(|(_, leg)| leg.flavor.is_bottom() && !leg.from_decay)
        .map(|(pos, _)| pos)
}

/// Number of non-decay bottom legs among the two initial-state legs
pub fn count_initial_state_bottoms(snapshot: &Snapshot) -> usize {
    snapshot
        .initial_legs()
        .iter()
        .filter(|leg| leg.flavor.is_bottom() && !leg.from_decay)
        .count()
}

/// Number of final-state legs outside the QCD shower
///
/// A change in this count between adjacent snapshots signals a decay step
/// rather than a shower emission.
pub fn count_non_qcd_final_state(snapshot: &Snapshot) -> usize {
    snapshot
        .final_legs()
        .iter()
        .filter(|leg| !leg.flavor.is_qcd())
        .count()
}

/// Light-quark and gluon multiplicities of the final state
///
/// Legs from hard decays do not count as shower activity and are skipped.
pub fn count_light_final_state(snapshot: &Snapshot) -> (usize, usize) {
    let mut num_quarks = 0;
    let mut num_gluons = 0;
    for leg in snapshot.final_legs() {
        if leg.from_decay {
            continue;
        }
        if leg.flavor.is_light_quark() {
            num_quarks += 1;
        } else if leg.flavor.is_gluon() {
            num_gluons += 1;
        }
    }
    (num_quarks, num_gluons)
}
