//! Trend projection: the chronological history of one column of one
//! item, read straight from the activity log.
//!
//! Projections are pure and never touch the log store, so they can be
//! recomputed on every request.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::activity_log::ActivityLogEntry;
use super::value::ColumnValue;
use super::ItemId;

/// One observation of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// When the observation was logged.
    pub logged_at: DateTime<Utc>,
    /// Observed value; `Null` means observed as unset.
    pub value: ColumnValue,
}

/// Observations of `column_name` on `item_id`, oldest first.
///
/// Entries that skipped the column are not included; entries that
/// recorded it as `Null` are. An empty result is a valid outcome.
/// Entries with equal timestamps keep their relative log order reversed,
/// so the earlier insertion comes first.
pub fn series<'a, I>(log: I, item_id: ItemId, column_name: &str) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a ActivityLogEntry>,
{
    let mut points: Vec<(usize, TrendPoint)> = log
        .into_iter()
        .filter(|e| e.item_id == item_id)
        .filter_map(|e| {
            e.column_snapshot.get(column_name).map(|v| TrendPoint {
                logged_at: e.logged_at,
                value: v.clone(),
            })
        })
        .enumerate()
        .collect();
    // Stable on timestamp; the secondary key flips display order for ties.
    points.sort_by(|(ia, a), (ib, b)| a.logged_at.cmp(&b.logged_at).then(ib.cmp(ia)));
    points.into_iter().map(|(_, p)| p).collect()
}

/// Aggregate view over a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendSummary {
    /// Number of points, including `Null` observations.
    pub observations: usize,
    /// Points whose value was `Null`.
    pub null_observations: usize,
    /// Timestamp of the oldest point.
    pub first_at: Option<DateTime<Utc>>,
    /// Timestamp of the newest point.
    pub last_at: Option<DateTime<Utc>>,
    /// Most recent value.
    pub latest: Option<ColumnValue>,
    /// Smallest numeric (or time) value.
    pub min: Option<ColumnValue>,
    /// Largest numeric (or time) value.
    pub max: Option<ColumnValue>,
    /// Last minus first non-null scalar, in units or seconds.
    pub change: Option<i64>,
}

/// Summarizes an ascending series.
#[must_use]
pub fn summarize(points: &[TrendPoint]) -> TrendSummary {
    let scalars: Vec<(i64, &ColumnValue)> = points
        .iter()
        .filter_map(|p| p.value.as_scalar().map(|s| (s, &p.value)))
        .collect();

    let min = scalars.iter().min_by_key(|(s, _)| *s).map(|(_, v)| (*v).clone());
    let max = scalars.iter().max_by_key(|(s, _)| *s).map(|(_, v)| (*v).clone());
    let change = match (scalars.first(), scalars.last()) {
        (Some((first, _)), Some((last, _))) if scalars.len() > 1 => last.checked_sub(*first),
        _ => None,
    };

    TrendSummary {
        observations: points.len(),
        null_observations: points.iter().filter(|p| p.value.is_null()).count(),
        first_at: points.first().map(|p| p.logged_at),
        last_at: points.last().map(|p| p.logged_at),
        latest: points.last().map(|p| p.value.clone()),
        min,
        max,
        change,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::activity_log::ActivityLog;
    use crate::domain::PodId;

    fn at(secs: i64) -> DateTime<Utc> {
        let Some(ts) = Utc.timestamp_opt(1_700_000_000 + secs, 0).single() else {
            panic!("valid timestamp");
        };
        ts
    }

    fn log_entry(
        pod: PodId,
        item: i64,
        secs: i64,
        values: &[(&str, ColumnValue)],
    ) -> ActivityLogEntry {
        let snapshot: BTreeMap<String, ColumnValue> = values
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        ActivityLogEntry::new(pod, ItemId::new(item), at(secs), snapshot, String::new())
    }

    #[test]
    fn filters_by_item_and_presence_and_sorts_ascending() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(log_entry(pod, 5, 10, &[("pace", ColumnValue::Number(6))]));
        log.append(log_entry(pod, 5, 30, &[("pace", ColumnValue::Null)]));
        log.append(log_entry(pod, 5, 20, &[("distance", ColumnValue::Number(5))]));
        log.append(log_entry(pod, 6, 40, &[("pace", ColumnValue::Number(4))]));

        let points = series(log.entries(), ItemId::new(5), "pace");
        assert_eq!(points.len(), 2);
        assert_eq!(points.first().map(|p| p.logged_at), Some(at(10)));
        assert_eq!(points.last().map(|p| p.value.clone()), Some(ColumnValue::Null));
    }

    #[test]
    fn empty_series_is_not_an_error() {
        let log = ActivityLog::new();
        let points = series(log.entries(), ItemId::new(1), "pace");
        assert!(points.is_empty());
        let summary = summarize(&points);
        assert_eq!(summary, TrendSummary::default());
    }

    #[test]
    fn ties_come_out_in_insertion_order() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(log_entry(pod, 1, 10, &[("reps", ColumnValue::Number(1))]));
        log.append(log_entry(pod, 1, 10, &[("reps", ColumnValue::Number(2))]));
        let values: Vec<_> = series(log.entries(), ItemId::new(1), "reps")
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, [ColumnValue::Number(1), ColumnValue::Number(2)]);
    }

    #[test]
    fn summary_of_numbers() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(log_entry(pod, 1, 10, &[("reps", ColumnValue::Number(8))]));
        log.append(log_entry(pod, 1, 20, &[("reps", ColumnValue::Null)]));
        log.append(log_entry(pod, 1, 30, &[("reps", ColumnValue::Number(5))]));
        log.append(log_entry(pod, 1, 40, &[("reps", ColumnValue::Number(12))]));

        let summary = summarize(&series(log.entries(), ItemId::new(1), "reps"));
        assert_eq!(summary.observations, 4);
        assert_eq!(summary.null_observations, 1);
        assert_eq!(summary.min, Some(ColumnValue::Number(5)));
        assert_eq!(summary.max, Some(ColumnValue::Number(12)));
        assert_eq!(summary.latest, Some(ColumnValue::Number(12)));
        assert_eq!(summary.change, Some(4));
        assert_eq!(summary.first_at, Some(at(10)));
    }

    #[test]
    fn summary_of_times_uses_seconds() {
        let pod = PodId::new();
        let (Ok(slow), Ok(fast)) = (ColumnValue::time(0, 50, 0), ColumnValue::time(0, 45, 30))
        else {
            panic!("valid times");
        };
        let mut log = ActivityLog::new();
        log.append(log_entry(pod, 1, 10, &[("duration", slow.clone())]));
        log.append(log_entry(pod, 1, 20, &[("duration", fast.clone())]));

        let summary = summarize(&series(log.entries(), ItemId::new(1), "duration"));
        assert_eq!(summary.min, Some(fast));
        assert_eq!(summary.max, Some(slow));
        assert_eq!(summary.change, Some(-270));
    }

    #[test]
    fn text_series_has_no_extrema() {
        let pod = PodId::new();
        let mut log = ActivityLog::new();
        log.append(log_entry(pod, 1, 10, &[("mood", ColumnValue::Text("ok".to_string()))]));
        let summary = summarize(&series(log.entries(), ItemId::new(1), "mood"));
        assert_eq!(summary.observations, 1);
        assert!(summary.min.is_none());
        assert!(summary.change.is_none());
    }
}
