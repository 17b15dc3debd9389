//! PostgreSQL implementation of [`PodStore`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{ColumnRow, ItemRow, LogRow, PodRow, encode_json};
use super::{PodStore, ValueEdit};
use crate::config::TrackerConfig;
use crate::domain::{
    ActivityLogEntry, ColumnDef, ColumnValue, ItemId, ItemRecord, PodId, PodSeed,
};
use crate::error::TrackerError;

type ItemTuple = (i64, String, serde_json::Value, serde_json::Value, DateTime<Utc>, DateTime<Utc>);
type PodTuple = (Uuid, String, serde_json::Value, DateTime<Utc>, i64);
type LogTuple = (Uuid, Uuid, i64, DateTime<Utc>, serde_json::Value, String);

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized by the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if the database cannot
    /// be reached.
    pub async fn connect(config: &TrackerConfig) -> Result<Self, TrackerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TrackerError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn pod_row(&self, pod_id: PodId) -> Result<PodRow, TrackerError> {
        let row = sqlx::query_as::<_, PodTuple>(
            "SELECT pod_id, name, visible_columns, created_at, next_item_id FROM pods WHERE pod_id = $1",
        )
        .bind(pod_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TrackerError::PodNotFound(*pod_id.as_uuid()))?;

        Ok(row_from_tuple(row))
    }

    async fn seed_from_row(&self, row: PodRow, log_limit: usize) -> Result<PodSeed, TrackerError> {
        let pod_id = PodId::from_uuid(row.pod_id);

        let columns = sqlx::query_as::<_, (String, String)>(
            "SELECT name, column_type FROM pod_columns WHERE pod_id = $1 ORDER BY position ASC",
        )
        .bind(row.pod_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(name, column_type)| ColumnDef::try_from(ColumnRow { name, column_type }))
        .collect::<Result<Vec<_>, _>>()?;

        let items = sqlx::query_as::<_, ItemTuple>(
            "SELECT item_id, name, default_values, user_values, created_at, updated_at \
             FROM items WHERE pod_id = $1 ORDER BY item_id ASC",
        )
        .bind(row.pod_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(item_id, name, default_values, user_values, created_at, updated_at)| {
            ItemRecord::try_from(ItemRow {
                item_id,
                name,
                default_values,
                user_values,
                created_at,
                updated_at,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

        let recent_log = self.fetch_recent_log(pod_id, log_limit).await?;

        Ok(PodSeed {
            pod_id,
            visible_columns: row.visible_names()?,
            name: row.name,
            created_at: row.created_at,
            columns,
            items,
            next_item_id: ItemId::new(row.next_item_id),
            recent_log,
        })
    }
}

fn row_from_tuple((pod_id, name, visible_columns, created_at, next_item_id): PodTuple) -> PodRow {
    PodRow {
        pod_id,
        name,
        visible_columns,
        created_at,
        next_item_id,
    }
}

fn expect_affected(
    result: &sqlx::postgres::PgQueryResult,
    missing: TrackerError,
) -> Result<(), TrackerError> {
    if result.rows_affected() == 0 {
        return Err(missing);
    }
    Ok(())
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[async_trait]
impl PodStore for PostgresPersistence {
    async fn load_pods(&self, log_limit: usize) -> Result<Vec<PodSeed>, TrackerError> {
        let rows = sqlx::query_as::<_, PodTuple>(
            "SELECT pod_id, name, visible_columns, created_at, next_item_id \
             FROM pods ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut seeds = Vec::with_capacity(rows.len());
        for row in rows {
            seeds.push(self.seed_from_row(row_from_tuple(row), log_limit).await?);
        }
        Ok(seeds)
    }

    async fn load_pod(&self, pod_id: PodId, log_limit: usize) -> Result<PodSeed, TrackerError> {
        let row = self.pod_row(pod_id).await?;
        self.seed_from_row(row, log_limit).await
    }

    async fn persist_pod(
        &self,
        pod_id: PodId,
        name: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        sqlx::query("INSERT INTO pods (pod_id, name, created_at) VALUES ($1, $2, $3)")
            .bind(pod_id.as_uuid())
            .bind(name)
            .bind(created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_pod(&self, pod_id: PodId) -> Result<(), TrackerError> {
        let result = sqlx::query("DELETE FROM pods WHERE pod_id = $1")
            .bind(pod_id.as_uuid())
            .execute(&self.pool)
            .await?;
        expect_affected(&result, TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    async fn persist_column_added(
        &self,
        pod_id: PodId,
        column: &ColumnDef,
    ) -> Result<(), TrackerError> {
        let null = encode_json(&ColumnValue::Null, "null value")?;
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO pod_columns (pod_id, name, column_type) VALUES ($1, $2, $3)")
            .bind(pod_id.as_uuid())
            .bind(&column.name)
            .bind(column.column_type.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE items SET default_values = default_values || jsonb_build_object($2::text, $3::jsonb) \
             WHERE pod_id = $1",
        )
        .bind(pod_id.as_uuid())
        .bind(&column.name)
        .bind(null)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn persist_column_removed(&self, pod_id: PodId, name: &str) -> Result<(), TrackerError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM pod_columns WHERE pod_id = $1 AND name = $2")
            .bind(pod_id.as_uuid())
            .bind(name)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(TrackerError::UnknownColumn(name.to_string()));
        }

        sqlx::query(
            "UPDATE items SET default_values = default_values - $2, user_values = user_values - $2 \
             WHERE pod_id = $1",
        )
        .bind(pod_id.as_uuid())
        .bind(name)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE pods SET visible_columns = visible_columns - $2 WHERE pod_id = $1")
            .bind(pod_id.as_uuid())
            .bind(name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn persist_visible_columns(
        &self,
        pod_id: PodId,
        names: &[String],
    ) -> Result<(), TrackerError> {
        let visible = encode_json(&names, "visible columns")?;
        let result = sqlx::query("UPDATE pods SET visible_columns = $2 WHERE pod_id = $1")
            .bind(pod_id.as_uuid())
            .bind(visible)
            .execute(&self.pool)
            .await?;
        expect_affected(&result, TrackerError::PodNotFound(*pod_id.as_uuid()))
    }

    async fn persist_item(&self, pod_id: PodId, item: &ItemRecord) -> Result<(), TrackerError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO items (pod_id, item_id, name, default_values, user_values, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(pod_id.as_uuid())
        .bind(item.id.get())
        .bind(&item.name)
        .bind(encode_json(&item.default_values, "item defaults")?)
        .bind(encode_json(&item.user_values, "item overrides")?)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE pods SET next_item_id = GREATEST(next_item_id, $2) WHERE pod_id = $1",
        )
        .bind(pod_id.as_uuid())
        .bind(item.id.next().get())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_item(&self, pod_id: PodId, item_id: ItemId) -> Result<(), TrackerError> {
        let result = sqlx::query("DELETE FROM items WHERE pod_id = $1 AND item_id = $2")
            .bind(pod_id.as_uuid())
            .bind(item_id.get())
            .execute(&self.pool)
            .await?;
        expect_affected(
            &result,
            TrackerError::ItemNotFound {
                pod_id: *pod_id.as_uuid(),
                item_id: item_id.get(),
            },
        )
    }

    async fn persist_value_edit(&self, edit: &ValueEdit) -> Result<(), TrackerError> {
        let value = encode_json(&edit.value, "override value")?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE items SET user_values = jsonb_set(user_values, ARRAY[$3::text], $4::jsonb, true), \
             updated_at = now() WHERE pod_id = $1 AND item_id = $2",
        )
        .bind(edit.pod_id.as_uuid())
        .bind(edit.item_id.get())
        .bind(&edit.column)
        .bind(&value)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(TrackerError::ItemNotFound {
                pod_id: *edit.pod_id.as_uuid(),
                item_id: edit.item_id.get(),
            });
        }

        sqlx::query(
            "INSERT INTO value_edits (pod_id, item_id, column_name, value, actor) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(edit.pod_id.as_uuid())
        .bind(edit.item_id.get())
        .bind(&edit.column)
        .bind(Some(value))
        .bind(&edit.actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn persist_override_cleared(
        &self,
        pod_id: PodId,
        item_id: ItemId,
        column: &str,
        actor: &str,
    ) -> Result<(), TrackerError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE items SET user_values = user_values - $3, updated_at = now() \
             WHERE pod_id = $1 AND item_id = $2",
        )
        .bind(pod_id.as_uuid())
        .bind(item_id.get())
        .bind(column)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(TrackerError::ItemNotFound {
                pod_id: *pod_id.as_uuid(),
                item_id: item_id.get(),
            });
        }

        // A NULL value marks a cleared override in the audit trail.
        sqlx::query(
            "INSERT INTO value_edits (pod_id, item_id, column_name, value, actor) \
             VALUES ($1, $2, $3, NULL, $4)",
        )
        .bind(pod_id.as_uuid())
        .bind(item_id.get())
        .bind(column)
        .bind(actor)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn persist_log_entry(
        &self,
        entry: &ActivityLogEntry,
    ) -> Result<DateTime<Utc>, TrackerError> {
        let logged_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            "INSERT INTO activity_log (entry_id, pod_id, item_id, logged_at, column_snapshot, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING logged_at",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.pod_id.as_uuid())
        .bind(entry.item_id.get())
        .bind(entry.logged_at)
        .bind(encode_json(&entry.column_snapshot, "log snapshot")?)
        .bind(&entry.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(logged_at)
    }

    async fn fetch_recent_log(
        &self,
        pod_id: PodId,
        limit: usize,
    ) -> Result<Vec<ActivityLogEntry>, TrackerError> {
        sqlx::query_as::<_, LogTuple>(
            "SELECT entry_id, pod_id, item_id, logged_at, column_snapshot, notes FROM activity_log \
             WHERE pod_id = $1 ORDER BY logged_at DESC, seq DESC LIMIT $2",
        )
        .bind(pod_id.as_uuid())
        .bind(limit_param(limit))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(entry_id, pod_id, item_id, logged_at, column_snapshot, notes)| {
            ActivityLogEntry::try_from(LogRow {
                entry_id,
                pod_id,
                item_id,
                logged_at,
                column_snapshot,
                notes,
            })
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_saturates() {
        assert_eq!(limit_param(100), 100);
        assert_eq!(limit_param(usize::MAX), i64::MAX);
    }

    #[test]
    fn visible_names_decode() {
        let row = PodRow {
            pod_id: Uuid::new_v4(),
            name: "gym".to_string(),
            visible_columns: serde_json::json!(["sets", "duration"]),
            created_at: Utc::now(),
            next_item_id: 1,
        };
        assert_eq!(
            row.visible_names().ok(),
            Some(vec!["sets".to_string(), "duration".to_string()])
        );
    }
}
