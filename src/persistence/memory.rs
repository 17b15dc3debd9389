//! In-process implementation of [`PodStore`].
//!
//! Holds the authoritative copy of every pod in memory. Used when
//! `PERSISTENCE_ENABLED` is off and as the collaborator in tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{PodStore, ValueEdit};
use crate::domain::{ActivityLogEntry, ColumnDef, ColumnValue, ItemId, ItemRecord, PodId, PodSeed};
use crate::error::TrackerError;

#[derive(Debug, Clone)]
struct StoredPod {
    name: String,
    created_at: DateTime<Utc>,
    columns: Vec<ColumnDef>,
    visible_columns: Vec<String>,
    items: BTreeMap<ItemId, ItemRecord>,
    next_item_id: ItemId,
    log: Vec<(u64, ActivityLogEntry)>,
}

impl StoredPod {
    fn item_mut(&mut self, pod_id: PodId, item_id: ItemId) -> Result<&mut ItemRecord, TrackerError> {
        self.items.get_mut(&item_id).ok_or(TrackerError::ItemNotFound {
            pod_id: *pod_id.as_uuid(),
            item_id: item_id.get(),
        })
    }

    fn recent_log(&self, limit: usize) -> Vec<ActivityLogEntry> {
        let mut sorted: Vec<&(u64, ActivityLogEntry)> = self.log.iter().collect();
        sorted.sort_by(|(sa, a), (sb, b)| b.logged_at.cmp(&a.logged_at).then(sb.cmp(sa)));
        sorted
            .into_iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }

    fn seed(&self, pod_id: PodId, log_limit: usize) -> PodSeed {
        PodSeed {
            pod_id,
            name: self.name.clone(),
            created_at: self.created_at,
            columns: self.columns.clone(),
            visible_columns: self.visible_columns.clone(),
            items: self.items.values().cloned().collect(),
            next_item_id: self.next_item_id,
            recent_log: self.recent_log(log_limit),
        }
    }
}

/// How [`MemoryStore`] assigns `logged_at` to incoming log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogClock {
    /// Keep the timestamp the entry was submitted with.
    #[default]
    Client,
    /// Stamp entries with the store's own clock on receipt.
    Server,
}

/// In-memory authoritative store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pods: RwLock<HashMap<PodId, StoredPod>>,
    clock: LogClock,
    next_seq: std::sync::atomic::AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store that keeps client timestamps.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that assigns `logged_at` itself.
    #[must_use]
    pub fn with_server_clock() -> Self {
        Self {
            clock: LogClock::Server,
            ..Self::default()
        }
    }

    /// Number of stored log entries for a pod, beyond any working-set cap.
    pub async fn log_len(&self, pod_id: PodId) -> usize {
        self.pods
            .read()
            .await
            .get(&pod_id)
            .map_or(0, |p| p.log.len())
    }

    async fn with_pod<T>(
        &self,
        pod_id: PodId,
        f: impl FnOnce(&mut StoredPod) -> Result<T, TrackerError> + Send,
    ) -> Result<T, TrackerError> {
        let mut pods = self.pods.write().await;
        let pod = pods
            .get_mut(&pod_id)
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))?;
        f(pod)
    }
}

#[async_trait]
impl PodStore for MemoryStore {
    async fn load_pods(&self, log_limit: usize) -> Result<Vec<PodSeed>, TrackerError> {
        let pods = self.pods.read().await;
        let mut seeds: Vec<PodSeed> = pods
            .iter()
            .map(|(id, pod)| pod.seed(*id, log_limit))
            .collect();
        seeds.sort_by_key(|s| s.created_at);
        Ok(seeds)
    }

    async fn load_pod(&self, pod_id: PodId, log_limit: usize) -> Result<PodSeed, TrackerError> {
        let pods = self.pods.read().await;
        pods.get(&pod_id)
            .map(|pod| pod.seed(pod_id, log_limit))
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    async fn persist_pod(
        &self,
        pod_id: PodId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        let mut pods = self.pods.write().await;
        if pods.contains_key(&pod_id) {
            return Err(TrackerError::InvalidRequest(format!(
                "pod {pod_id} already stored"
            )));
        }
        pods.insert(
            pod_id,
            StoredPod {
                name: name.to_string(),
                created_at,
                columns: Vec::new(),
                visible_columns: Vec::new(),
                items: BTreeMap::new(),
                next_item_id: ItemId::new(1),
                log: Vec::new(),
            },
        );
        Ok(())
    }

    async fn delete_pod(&self, pod_id: PodId) -> Result<(), TrackerError> {
        self.pods
            .write()
            .await
            .remove(&pod_id)
            .map(|_| ())
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    async fn persist_column_added(
        &self,
        pod_id: PodId,
        column: &ColumnDef,
    ) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            if pod.columns.iter().any(|c| c.name == column.name) {
                return Err(TrackerError::DuplicateColumn(column.name.clone()));
            }
            pod.columns.push(column.clone());
            for item in pod.items.values_mut() {
                item.default_values
                    .insert(column.name.clone(), ColumnValue::Null);
            }
            Ok(())
        })
        .await
    }

    async fn persist_column_removed(&self, pod_id: PodId, name: &str) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            let before = pod.columns.len();
            pod.columns.retain(|c| c.name != name);
            if pod.columns.len() == before {
                return Err(TrackerError::UnknownColumn(name.to_string()));
            }
            pod.visible_columns.retain(|v| v != name);
            for item in pod.items.values_mut() {
                item.default_values.remove(name);
                item.user_values.remove(name);
            }
            Ok(())
        })
        .await
    }

    async fn persist_visible_columns(
        &self,
        pod_id: PodId,
        names: &[String],
    ) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            pod.visible_columns = names.to_vec();
            Ok(())
        })
        .await
    }

    async fn persist_item(&self, pod_id: PodId, item: &ItemRecord) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            if pod.items.contains_key(&item.id) {
                return Err(TrackerError::InvalidRequest(format!(
                    "item {} already stored",
                    item.id
                )));
            }
            pod.items.insert(item.id, item.clone());
            pod.next_item_id = pod.next_item_id.max(item.id.next());
            Ok(())
        })
        .await
    }

    async fn delete_item(&self, pod_id: PodId, item_id: ItemId) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            pod.items
                .remove(&item_id)
                .map(|_| ())
                .ok_or(TrackerError::ItemNotFound {
                    pod_id: *pod_id.as_uuid(),
                    item_id: item_id.get(),
                })
        })
        .await
    }

    async fn persist_value_edit(&self, edit: &ValueEdit) -> Result<(), TrackerError> {
        self.with_pod(edit.pod_id, |pod| {
            let item = pod.item_mut(edit.pod_id, edit.item_id)?;
            item.user_values
                .insert(edit.column.clone(), edit.value.clone());
            item.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn persist_override_cleared(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        _actor: &str,
    ) -> Result<(), TrackerError> {
        self.with_pod(pod_id, |pod| {
            let item = pod.item_mut(pod_id, item_id)?;
            item.user_values.remove(column);
            item.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn persist_log_entry(
        &self,
        entry: &ActivityLogEntry,
    ) -> Result<DateTime<Utc>, TrackerError> {
        let logged_at = match self.clock {
            LogClock::Client => entry.logged_at,
            LogClock::Server => Utc::now(),
        };
        let seq = self
            .next_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let stored = entry.clone().with_logged_at(logged_at);
        self.with_pod(entry.pod_id, |pod| {
            if pod.log.iter().any(|(_, e)| e.id == stored.id) {
                return Err(TrackerError::InvalidRequest(format!(
                    "log entry {} already stored",
                    stored.id.as_uuid()
                )));
            }
            pod.log.push((seq, stored));
            Ok(logged_at)
        })
        .await
    }

    async fn fetch_recent_log(
        &self,
        pod_id: PodId,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, TrackerError> {
        let pods = self.pods.read().await;
        pods.get(&pod_id)
            .map(|pod| pod.recent_log(limit))
            .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))
    }
}
