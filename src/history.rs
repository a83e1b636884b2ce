//! Storage for the cluster history of one event
//!
//! The shower subsystem records its clustering steps as a chain of
//! snapshots, from the hard-process configuration toward ever softer ones.
//! The engine only ever reads this data, so the chain is stored as an arena
//! of snapshots addressed by stable indices, with the predecessor/successor
//! links kept as optional indices instead of pointers.

use crate::{flavor::Flavor, momentum::Momentum};

/// Number of initial-state legs at the front of every snapshot
pub const NUM_INITIAL: usize = 2;

/// One particle within a snapshot
#[derive(Clone, Debug)]
pub struct Leg {
    /// Signed flavor code
    pub flavor: Flavor,

    /// Whether this leg originates from a hard decay rather than the shower
    pub from_decay: bool,

    /// 4-momentum (the engine only reads the longitudinal component)
    pub momentum: Momentum,
}
//
impl Leg {
    /// Build a leg from its flavor, decay origin, and momentum
    pub fn new(flavor: Flavor, from_decay: bool, momentum: Momentum) -> Self {
        Self {
            flavor,
            from_decay,
            momentum,
        }
    }
}

/// Stable index of a snapshot within its cluster history
pub type SnapshotId = usize;

/// One intermediate particle-content configuration of the clustering history
///
/// The first [`NUM_INITIAL`] legs are the initial state, the rest is the
/// final state.
#[derive(Debug)]
pub struct Snapshot {
    legs: Vec<Leg>,
    prev: Option<SnapshotId>,
    next: Option<SnapshotId>,
}
//
impl Snapshot {
    /// Access all legs, initial state first
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Access the two initial-state legs
    pub fn initial_legs(&self) -> &[Leg] {
        &self.legs[..NUM_INITIAL]
    }

    /// Access the final-state legs
    pub fn final_legs(&self) -> &[Leg] {
        &self.legs[NUM_INITIAL..]
    }
}

/// Arena owning the totally ordered snapshot chain of one event
///
/// The event record owns the history and the history owns its snapshots, so
/// all of this dies together at the end of the event.
#[derive(Debug)]
pub struct ClusterHistory {
    snapshots: Vec<Snapshot>,
}
//
impl ClusterHistory {
    /// Build a history from per-snapshot leg lists, hardest configuration
    /// first, linking each snapshot to its immediate neighbours
    ///
    /// Chain well-formedness is the shower subsystem's contract: an empty
    /// chain or a snapshot without its two initial-state legs is a bug in
    /// the producer, not a condition to recover from.
    pub fn from_legs(snapshots: Vec<Vec<Leg>>) -> Self {
        assert!(!snapshots.is_empty(), "A cluster history cannot be empty");
        let last = snapshots.len() - 1;
        let snapshots = snapshots
            .into_iter()
            .enumerate()
            .map(|(id, legs)| {
                assert!(
                    legs.len() >= NUM_INITIAL,
                    "A snapshot must carry its two initial-state legs"
                );
                Snapshot {
                    legs,
                    prev: (id > 0).then(|| id - 1),
                    next: (id < last).then(|| id + 1),
                }
            })
            .collect();
        Self { snapshots }
    }

    /// Index of the hard-process snapshot, where every traversal starts
    pub fn root(&self) -> SnapshotId {
        0
    }

    /// Access a snapshot by index
    pub fn snapshot(&self, id: SnapshotId) -> &Snapshot {
        &self.snapshots[id]
    }

    /// Step toward the harder neighbouring configuration, if any
    pub fn prev(&self, id: SnapshotId) -> Option<SnapshotId> {
        self.snapshots[id].prev
    }

    /// Step toward the softer neighbouring configuration, if any
    pub fn next(&self, id: SnapshotId) -> Option<SnapshotId> {
        self.snapshots[id].next
    }
}
