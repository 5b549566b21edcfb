use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::repository::{
    InstanceId, Partition, PartitionChange, SessionStore, StorageError, StoredPartition,
};

use super::SqliteRepository;

#[async_trait]
impl SessionStore for SqliteRepository {
    async fn load(&self, partition: Partition) -> Result<Option<StoredPartition>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload, origin, updated_at
            FROM session_partitions
            WHERE name = ?1
            ",
        )
        .bind(partition.name())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let origin: String = row
            .try_get("origin")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let updated_at: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let origin = Uuid::parse_str(&origin)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(StoredPartition {
            payload,
            origin: InstanceId::from_uuid(origin),
            updated_at,
        }))
    }

    async fn save(
        &self,
        partition: Partition,
        payload: &str,
        origin: InstanceId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO session_partitions (name, payload, origin, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                payload = excluded.payload,
                origin = excluded.origin,
                updated_at = excluded.updated_at
            ",
        )
        .bind(partition.name())
        .bind(payload)
        .bind(origin.as_uuid().to_string())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let _ = self.changes.send(PartitionChange { partition, origin });
        Ok(())
    }

    async fn clear(&self, partition: Partition, origin: InstanceId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_partitions WHERE name = ?1")
            .bind(partition.name())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let _ = self.changes.send(PartitionChange { partition, origin });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PartitionChange> {
        self.changes.subscribe()
    }
}
