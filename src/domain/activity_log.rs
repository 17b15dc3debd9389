//! Activity log: an append-only, strictly time-ordered journal of
//! snapshot events.
//!
//! The store is kept sorted at all times: most recent `logged_at` first,
//! ties broken by insertion sequence (later insertion first). Inserts use
//! a binary search for the insertion point; nothing ever re-sorts the
//! whole store. Entries are immutable; they are only inserted or evicted.
//! A server-assigned timestamp replaces the entry and moves it, keeping
//! its original insertion sequence.
//!
//! The store is a bounded client-side working set. [`ActivityLog::prune`]
//! evicts the oldest entries beyond a cap; the authoritative log lives
//! with the persistence collaborator.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value::ColumnValue;
use super::{ItemId, LogEntryId, PodId};
use crate::error::TrackerError;

/// Reference retention cap for the working set.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// One logged activity: a snapshot of column values at a point in time.
///
/// A column missing from `column_snapshot` was skipped (not observed);
/// a column mapped to [`ColumnValue::Null`] was observed as unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// Entry identifier.
    pub id: LogEntryId,
    /// Item the activity belongs to.
    pub item_id: ItemId,
    /// Owning pod.
    pub pod_id: PodId,
    /// When the activity happened.
    pub logged_at: DateTime<Utc>,
    /// Observed column values keyed by column name.
    pub column_snapshot: BTreeMap<String, ColumnValue>,
    /// Free-form notes.
    pub notes: String,
}

impl ActivityLogEntry {
    /// Creates an entry with a fresh id.
    #[must_use]
    pub fn new(
        pod_id: PodId,
        item_id: ItemId,
        logged_at: DateTime<Utc>,
        column_snapshot: BTreeMap<String, ColumnValue>,
        notes: String,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            item_id,
            pod_id,
            logged_at,
            column_snapshot,
            notes,
        }
    }

    /// Returns the same entry stamped with another timestamp.
    #[must_use]
    pub fn with_logged_at(self, logged_at: DateTime<Utc>) -> Self {
        Self { logged_at, ..self }
    }

    /// Returns `true` if the snapshot records `column` (including `Null`).
    #[must_use]
    pub fn observed(&self, column: &str) -> bool {
        self.column_snapshot.contains_key(column)
    }
}

/// Builds the snapshot stored in a log entry.
///
/// Every name in `skipped_columns` is left out entirely, not even as
/// `Null`. All other columns are recorded with their submitted value.
#[must_use]
pub fn build_snapshot<I>(
    column_values: I,
    skipped_columns: &HashSet<String>,
) -> BTreeMap<String, ColumnValue>
where
    I: IntoIterator<Item = (String, ColumnValue)>,
{
    column_values
        .into_iter()
        .filter(|(name, _)| !skipped_columns.contains(name))
        .collect()
}

/// Result of merging an authoritative page into the working set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Entries that were not in the working set.
    pub inserted: usize,
    /// Known entries whose timestamp was replaced.
    pub reconciled: usize,
    /// Entries evicted by the retention cap afterwards.
    pub evicted: usize,
}

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    entry: ActivityLogEntry,
}

impl Slot {
    /// `true` if `self` sorts before `other`.
    fn precedes(&self, other: &Self) -> bool {
        self.entry.logged_at > other.entry.logged_at
            || (self.entry.logged_at == other.entry.logged_at && self.seq > other.seq)
    }
}

/// Sorted working set of activity log entries for one pod.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    slots: Vec<Slot>,
    next_seq: u64,
}

impl ActivityLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the working set with a most-recent-first page from the
    /// collaborator, then caps it at `max_entries`. Ties keep the page's
    /// order.
    pub fn seed(&mut self, entries: Vec<ActivityLogEntry>, max_entries: usize) -> usize {
        self.slots.clear();
        for entry in entries.into_iter().rev() {
            self.append(entry);
        }
        self.prune(max_entries)
    }

    /// Inserts an entry at its sorted position and returns that position.
    pub fn append(&mut self, entry: ActivityLogEntry) -> usize {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.insert_slot(Slot { seq, entry })
    }

    fn insert_slot(&mut self, slot: Slot) -> usize {
        let index = self.slots.partition_point(|s| s.precedes(&slot));
        self.slots.insert(index, slot);
        index
    }

    /// Evicts the oldest entries until at most `max_entries` remain.
    /// Returns how many were evicted.
    pub fn prune(&mut self, max_entries: usize) -> usize {
        let evicted = self.slots.len().saturating_sub(max_entries);
        if evicted > 0 {
            self.slots.truncate(max_entries);
        }
        evicted
    }

    /// Replaces the timestamp of entry `id` with the authoritative one and
    /// moves it to its sorted position. Returns `false` if the timestamp
    /// was already equal.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::LogEntryNotFound`] if the entry is not in
    /// the working set (never appended, or already evicted).
    pub fn reconcile(
        &mut self,
        id: LogEntryId,
        logged_at: DateTime<Utc>,
    ) -> Result<bool, TrackerError> {
        let index = self
            .position(id)
            .ok_or(TrackerError::LogEntryNotFound(*id.as_uuid()))?;
        if self
            .slots
            .get(index)
            .is_some_and(|s| s.entry.logged_at == logged_at)
        {
            return Ok(false);
        }
        let Slot { seq, entry } = self.slots.remove(index);
        self.insert_slot(Slot {
            seq,
            entry: entry.with_logged_at(logged_at),
        });
        Ok(true)
    }

    /// Merges a most-recent-first page from the collaborator: unknown
    /// entries are inserted, known entries take the page's timestamp.
    /// The working set is then capped at `max_entries`.
    pub fn merge_page(
        &mut self,
        entries: Vec<ActivityLogEntry>,
        max_entries: usize,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for entry in entries.into_iter().rev() {
            if self.position(entry.id).is_some() {
                if let Ok(true) = self.reconcile(entry.id, entry.logged_at) {
                    outcome.reconciled += 1;
                }
            } else {
                self.append(entry);
                outcome.inserted += 1;
            }
        }
        outcome.evicted = self.prune(max_entries);
        outcome
    }

    fn position(&self, id: LogEntryId) -> Option<usize> {
        self.slots.iter().position(|s| s.entry.id == id)
    }

    /// Number of entries in the working set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the working set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries in display order (most recent first).
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &ActivityLogEntry> {
        self.slots.iter().map(|s| &s.entry)
    }

    /// Looks up an entry by id.
    #[must_use]
    pub fn get(&self, id: LogEntryId) -> Option<&ActivityLogEntry> {
        self.slots.iter().map(|s| &s.entry).find(|e| e.id == id)
    }

    /// The most recent entry overall.
    #[must_use]
    pub fn most_recent(&self) -> Option<&ActivityLogEntry> {
        self.slots.first().map(|s| &s.entry)
    }

    /// Entries for one item in display order.
    pub fn entries_for_item(
        &self,
        item_id: ItemId,
    ) -> impl DoubleEndedIterator<Item = &ActivityLogEntry> {
        self.entries().filter(move |e| e.item_id == item_id)
    }

    /// The most recent entry for one item.
    #[must_use]
    pub fn latest_for_item(&self, item_id: ItemId) -> Option<&ActivityLogEntry> {
        self.entries_for_item(item_id).next()
    }

    /// Entries logged at or after `since`, most recent first. Found by
    /// binary search on the sorted store.
    pub fn entries_since(
        &self,
        since: DateTime<Utc>,
    ) -> impl DoubleEndedIterator<Item = &ActivityLogEntry> {
        let end = self.slots.partition_point(|s| s.entry.logged_at >= since);
        self.slots.iter().take(end).map(|s| &s.entry)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        let Some(ts) = Utc.timestamp_opt(1_700_000_000 + secs, 0).single() else {
            panic!("valid timestamp");
        };
        ts
    }

    fn entry(pod: PodId, item: i64, secs: i64, note: &str) -> ActivityLogEntry {
        ActivityLogEntry::new(
            pod,
            ItemId::new(item),
            at(secs),
            BTreeMap::new(),
            note.to_string(),
        )
    }

    fn assert_ordered(log: &ActivityLog) {
        for pair in log.slots.windows(2) {
            let [a, b] = pair else {
                panic!("windows(2) yields pairs");
            };
            assert!(a.precedes(b), "store out of order");
        }
    }

    #[test]
    fn append_keeps_descending_order() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(entry(pod, 1, 10, "b"));
        log.append(entry(pod, 1, 30, "c"));
        log.append(entry(pod, 1, 20, "a"));
        let notes: Vec<_> = log.entries().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, ["c", "a", "b"]);
    }

    #[test]
    fn ties_put_later_insertion_first() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(entry(pod, 1, 10, "first"));
        log.append(entry(pod, 1, 10, "second"));
        let notes: Vec<_> = log.entries().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, ["second", "first"]);
    }

    #[test]
    fn prune_evicts_oldest() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        for i in 0..5 {
            log.append(entry(pod, 1, i, &i.to_string()));
        }
        assert_eq!(log.prune(3), 2);
        let notes: Vec<_> = log.entries().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, ["4", "3", "2"]);
        assert_eq!(log.prune(3), 0);
    }

    #[test]
    fn skipped_columns_are_absent_not_null() {
        let skipped: HashSet<String> = ["weight".to_string()].into();
        let snapshot = build_snapshot(
            [
                ("reps".to_string(), ColumnValue::Number(10)),
                ("weight".to_string(), ColumnValue::Null),
            ],
            &skipped,
        );
        assert_eq!(snapshot.get("reps"), Some(&ColumnValue::Number(10)));
        assert!(!snapshot.contains_key("weight"));
    }

    #[test]
    fn reconcile_moves_entry_to_server_time() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(entry(pod, 1, 10, "old"));
        let local = entry(pod, 1, 50, "mine");
        let id = local.id;
        log.append(local);
        assert_eq!(log.most_recent().map(|e| e.id), Some(id));

        assert!(matches!(log.reconcile(id, at(5)), Ok(true)));
        assert_eq!(log.entries().last().map(|e| e.id), Some(id));
        assert!(matches!(log.reconcile(id, at(5)), Ok(false)));
        assert_ordered(&log);

        assert!(matches!(
            log.reconcile(LogEntryId::new(), at(1)),
            Err(TrackerError::LogEntryNotFound(_))
        ));
    }

    #[test]
    fn seed_preserves_page_order_for_ties() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        let page = vec![
            entry(pod, 1, 20, "newest"),
            entry(pod, 1, 10, "tie-a"),
            entry(pod, 1, 10, "tie-b"),
        ];
        assert_eq!(log.seed(page, 100), 0);
        let notes: Vec<_> = log.entries().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, ["newest", "tie-a", "tie-b"]);
    }

    #[test]
    fn merge_page_inserts_and_reconciles() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        let mine = entry(pod, 1, 100, "mine");
        log.append(mine.clone());
        log.append(entry(pod, 1, 50, "older"));

        let page = vec![
            entry(pod, 2, 90, "remote"),
            mine.clone().with_logged_at(at(80)),
        ];
        let outcome = log.merge_page(page, 100);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.reconciled, 1);
        assert_eq!(outcome.evicted, 0);
        let notes: Vec<_> = log.entries().map(|e| e.notes.as_str()).collect();
        assert_eq!(notes, ["remote", "mine", "older"]);
    }

    #[test]
    fn recency_lookups() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(entry(pod, 1, 10, "a"));
        log.append(entry(pod, 2, 20, "b"));
        log.append(entry(pod, 1, 30, "c"));
        assert_eq!(log.latest_for_item(ItemId::new(1)).map(|e| e.notes.as_str()), Some("c"));
        assert_eq!(log.entries_for_item(ItemId::new(1)).count(), 2);
        let since: Vec<_> = log.entries_since(at(20)).map(|e| e.notes.as_str()).collect();
        assert_eq!(since, ["c", "b"]);
        assert!(log.latest_for_item(ItemId::new(9)).is_none());
    }

    proptest! {
        #[test]
        fn random_appends_stay_sorted(stamps in proptest::collection::vec(0i64..50, 0..200)) {
            let pod = PodId::new();
            let mut log = ActivityLog::new();
            for (i, s) in stamps.iter().enumerate() {
                log.append(entry(pod, 1, *s, &i.to_string()));
            }
            prop_assert_eq!(log.len(), stamps.len());
            assert_ordered(&log);
        }

        #[test]
        fn prune_keeps_exactly_the_most_recent(stamps in proptest::collection::vec(0i64..1000, 0..300)) {
            let pod = PodId::new();
            let mut log = ActivityLog::new();
            for (i, s) in stamps.iter().enumerate() {
                log.append(entry(pod, 1, *s, &i.to_string()));
            }
            let mut reference: Vec<(i64, usize)> =
                stamps.iter().copied().enumerate().map(|(i, s)| (s, i)).collect();
            reference.sort_by(|a, b| b.cmp(a));
            reference.truncate(DEFAULT_MAX_ENTRIES);

            log.prune(DEFAULT_MAX_ENTRIES);
            prop_assert!(log.len() <= DEFAULT_MAX_ENTRIES);
            let kept: Vec<String> = log.entries().map(|e| e.notes.clone()).collect();
            let expected: Vec<String> = reference.iter().map(|(_, i)| i.to_string()).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
