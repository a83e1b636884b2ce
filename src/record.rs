//! Stand-in for the host framework's per-event record
//!
//! The real event store lives in the host generator; the engine only needs
//! two things from it, namely the cluster history attached by the shower
//! and an integer tag side-channel that downstream consumers can filter on.

use crate::history::ClusterHistory;
use std::collections::BTreeMap;

/// Key under which the annotate policy stores its verdict tag
pub const VETO_TAG: &str = "Veto";

/// Per-event data handed to the engine by the host framework
#[derive(Debug)]
pub struct EventRecord {
    /// Cluster history attached by the shower subsystem, absent for
    /// production modes that do not go through clustering
    history: Option<ClusterHistory>,

    /// Integer tag side-channel, keyed by string
    tags: BTreeMap<String, i32>,
}
//
impl EventRecord {
    /// Wrap the (possibly absent) cluster history of one event
    pub fn new(history: Option<ClusterHistory>) -> Self {
        Self {
            history,
            tags: BTreeMap::new(),
        }
    }

    /// Access the cluster history, if the event carries one
    pub fn cluster_history(&self) -> Option<&ClusterHistory> {
        self.history.as_ref()
    }

    /// Write an integer tag into the side-channel
    pub fn set_tag(&mut self, key: &str, value: i32) {
        self.tags.insert(key.to_owned(), value);
    }

    /// Read back an integer tag
    ///
    /// Filtering on the tag is the downstream consumers' job; the driver
    /// only reads it back in tests.
    #[allow(dead_code)]
    pub fn tag(&self, key: &str) -> Option<i32> {
        self.tags.get(key).copied()
    }
}
