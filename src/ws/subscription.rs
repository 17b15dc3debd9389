//! Per-connection subscription manager.
//!
//! Tracks which pod IDs a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::PodId;

/// Wildcard target matching every pod.
pub const WILDCARD: &str = "*";

/// Subscription targets parsed from a command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Targets {
    /// Valid pod ids.
    pub ids: Vec<PodId>,
    /// `true` if `"*"` was present.
    pub wildcard: bool,
    /// Entries that were neither `"*"` nor a UUID.
    pub rejected: Vec<String>,
}

impl Targets {
    /// Splits raw command targets into ids, wildcard and rejects.
    #[must_use]
    pub fn parse(raw: &[String]) -> Self {
        let mut targets = Self::default();
        for s in raw {
            if s == WILDCARD {
                targets.wildcard = true;
            } else if let Ok(uuid) = s.parse::<uuid::Uuid>() {
                targets.ids.push(PodId::from_uuid(uuid));
            } else {
                targets.rejected.push(s.clone());
            }
        }
        targets
    }
}

/// Manages the set of pod subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed pod IDs. If `subscribe_all` is true, this set is ignored.
    pod_ids: HashSet<PodId>,
    /// Whether the client subscribes to all pods (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the targets to the subscription set.
    pub fn subscribe(&mut self, targets: &Targets) {
        self.subscribe_all |= targets.wildcard;
        self.pod_ids.extend(targets.ids.iter().copied());
    }

    /// Removes the targets; a wildcard target turns the wildcard off.
    pub fn unsubscribe(&mut self, targets: &Targets) {
        if targets.wildcard {
            self.subscribe_all = false;
        }
        for id in &targets.ids {
            self.pod_ids.remove(id);
        }
    }

    /// Forgets a pod that no longer exists.
    pub fn forget(&mut self, pod_id: PodId) {
        self.pod_ids.remove(&pod_id);
    }

    /// Returns `true` if the given pod ID matches the subscription filter.
    #[must_use]
    pub fn matches(&self, pod_id: PodId) -> bool {
        self.subscribe_all || self.pod_ids.contains(&pod_id)
    }

    /// Returns the number of explicitly subscribed pod IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pod_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }

    /// Explicit subscriptions as strings, sorted.
    #[must_use]
    pub fn pod_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pod_ids.iter().map(ToString::to_string).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(ids: &[PodId], wildcard: bool) -> Targets {
        Targets {
            ids: ids.to_vec(),
            wildcard,
            rejected: Vec::new(),
        }
    }

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(PodId::new()));
    }

    #[test]
    fn subscribe_specific_pod() {
        let mut mgr = SubscriptionManager::new();
        let id = PodId::new();
        mgr.subscribe(&targets(&[id], false));
        assert!(mgr.matches(id));
        assert!(!mgr.matches(PodId::new()));
    }

    #[test]
    fn wildcard_can_be_dropped_again() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&targets(&[], true));
        assert!(mgr.matches(PodId::new()));
        mgr.unsubscribe(&targets(&[], true));
        assert!(!mgr.is_subscribed_all());
        assert!(!mgr.matches(PodId::new()));
    }

    #[test]
    fn forget_drops_removed_pod() {
        let mut mgr = SubscriptionManager::new();
        let id = PodId::new();
        mgr.subscribe(&targets(&[id], false));
        mgr.forget(id);
        assert_eq!(mgr.count(), 0);
    }

    #[test]
    fn parse_separates_rejects() {
        let id = PodId::new();
        let parsed = Targets::parse(&[id.to_string(), "*".to_string(), "nope".to_string()]);
        assert_eq!(parsed.ids, vec![id]);
        assert!(parsed.wildcard);
        assert_eq!(parsed.rejected, vec!["nope".to_string()]);
    }
}
