//! Concurrent pod storage with per-pod fine-grained locking.
//!
//! [`PodRegistry`] stores all loaded pods in a `HashMap` where each entry
//! is individually protected by a [`tokio::sync::RwLock`]. Readers of one
//! pod proceed concurrently; writers to one pod are serialized; different
//! pods never contend beyond the brief outer map lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::PodId;
use super::pod::{PodState, PodSummary};
use crate::error::TrackerError;

/// Shared handle to one pod behind its own lock.
pub type PodHandle = Arc<RwLock<PodState>>;

/// Central store for all loaded pods.
#[derive(Debug)]
pub struct PodRegistry {
    pods: RwLock<HashMap<PodId, PodHandle>>,
}

impl PodRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pods: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new pod.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] if a pod with the same ID
    /// is already loaded.
    pub async fn insert(&self, pod: PodState) -> Result<PodId, TrackerError> {
        let pod_id = pod.pod_id;
        let mut map = self.pods.write().await;
        if map.contains_key(&pod_id) {
            return Err(TrackerError::InvalidRequest(format!(
                "pod {pod_id} already exists"
            )));
        }
        map.insert(pod_id, Arc::new(RwLock::new(pod)));
        Ok(pod_id)
    }

    /// Inserts a pod, replacing the state of an already loaded pod with the
    /// same ID in place. Returns `true` if a pod was replaced.
    ///
    /// Replacement happens under the existing pod's write lock, so handles
    /// held by other tasks observe either the old or the new state.
    pub async fn replace(&self, pod: PodState) -> bool {
        let existing = {
            let map = self.pods.read().await;
            map.get(&pod.pod_id).cloned()
        };
        if let Some(handle) = existing {
            *handle.write().await = pod;
            return true;
        }
        let mut map = self.pods.write().await;
        map.insert(pod.pod_id, Arc::new(RwLock::new(pod)));
        false
    }

    /// Returns the lock-protected handle of a pod.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if no pod with the given ID
    /// is loaded.
    pub async fn get(&self, pod_id: PodId) -> Result<PodHandle, TrackerError> {
        let map = self.pods.read().await;
        map.get(&pod_id)
            .cloned()
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    /// Removes a pod from the registry, returning its handle. Tasks that
    /// still hold the handle keep a detached copy.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PodNotFound`] if no pod with the given ID
    /// is loaded.
    pub async fn remove(&self, pod_id: PodId) -> Result<PodHandle, TrackerError> {
        let mut map = self.pods.write().await;
        map.remove(&pod_id)
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    /// Returns summaries of all pods ordered by creation time, optionally
    /// filtered by a case-insensitive name substring.
    pub async fn list(&self, name_filter: Option<&str>) -> Vec<PodSummary> {
        let needle = name_filter.map(str::to_lowercase);
        let map = self.pods.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for pod_lock in map.values() {
            let pod = pod_lock.read().await;
            if let Some(needle) = needle.as_deref()
                && !pod.name.to_lowercase().contains(needle)
            {
                continue;
            }
            summaries.push(PodSummary::from(&*pod));
        }
        summaries.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pod_id.as_uuid().cmp(b.pod_id.as_uuid()))
        });
        summaries
    }

    /// Returns the number of loaded pods.
    pub async fn len(&self) -> usize {
        self.pods.read().await.len()
    }

    /// Returns `true` if no pods are loaded.
    pub async fn is_empty(&self) -> bool {
        self.pods.read().await.is_empty()
    }
}

impl Default for PodRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ColumnType;

    fn make_pod(name: &str) -> PodState {
        PodState::new(PodId::new(), name.to_string())
    }

    #[tokio::test]
    async fn insert_and_get() {
        let registry = PodRegistry::new();
        let pod = make_pod("gym");
        let id = pod.pod_id;

        let Ok(inserted) = registry.insert(pod).await else {
            panic!("insert should succeed");
        };
        assert_eq!(inserted, id);
        assert!(registry.get(id).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let registry = PodRegistry::new();
        let pod = make_pod("gym");
        let twin = PodState::new(pod.pod_id, "gym again".to_string());
        let _ = registry.insert(pod).await;
        assert!(matches!(
            registry.insert(twin).await,
            Err(TrackerError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let registry = PodRegistry::new();
        let result = registry.get(PodId::new()).await;
        assert!(matches!(result, Err(TrackerError::PodNotFound(_))));
    }

    #[tokio::test]
    async fn remove_then_get_fails() {
        let registry = PodRegistry::new();
        let pod = make_pod("gym");
        let id = pod.pod_id;
        let _ = registry.insert(pod).await;

        assert!(registry.remove(id).await.is_ok());
        assert!(registry.get(id).await.is_err());
        assert!(registry.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn replace_swaps_state_behind_existing_handle() {
        let registry = PodRegistry::new();
        let pod = make_pod("gym");
        let id = pod.pod_id;
        let _ = registry.insert(pod).await;
        let Ok(handle) = registry.get(id).await else {
            panic!("pod exists");
        };

        let mut fresh = PodState::new(id, "gym".to_string());
        let _ = fresh.add_column("reps", ColumnType::Number);
        assert!(registry.replace(fresh).await);
        assert_eq!(handle.read().await.schema().len(), 1);

        assert!(!registry.replace(make_pod("new")).await);
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn list_filters_by_name() {
        let registry = PodRegistry::new();
        let _ = registry.insert(make_pod("Gym")).await;
        let _ = registry.insert(make_pod("Food")).await;

        assert_eq!(registry.list(None).await.len(), 2);
        let matched = registry.list(Some("gym")).await;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched.first().map(|s| s.name.as_str()), Some("Gym"));
        assert!(registry.list(Some("sleep")).await.is_empty());
    }

    #[tokio::test]
    async fn len_and_is_empty() {
        let registry = PodRegistry::new();
        assert!(registry.is_empty().await);
        assert_eq!(registry.len().await, 0);

        let _ = registry.insert(make_pod("gym")).await;
        assert!(!registry.is_empty().await);
        assert_eq!(registry.len().await, 1);
    }
}
