use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use quiz_core::model::QuizMode;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── PARTITIONS ────────────────────────────────────────────────────────────────
//

/// Independent named slots of persisted client state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// Exam-mode session state.
    Exam,
    /// Study-mode session state.
    Study,
    /// The currently loaded quiz (id, document name, questions).
    Quiz,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Exam, Partition::Study, Partition::Quiz];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Partition::Exam => "exam-storage",
            Partition::Study => "study-storage",
            Partition::Quiz => "quiz-storage",
        }
    }

    #[must_use]
    pub fn for_mode(mode: QuizMode) -> Self {
        match mode {
            QuizMode::Exam => Partition::Exam,
            QuizMode::Study => Partition::Study,
        }
    }
}

/// Identifies one open view (window) writing to the store, so it can ignore
/// its own change notifications.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(Uuid);

impl InstanceId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self.0)
    }
}

/// Broadcast after every write or clear of a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionChange {
    pub partition: Partition,
    pub origin: InstanceId,
}

/// Raw persisted document for a partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPartition {
    pub payload: String,
    pub origin: InstanceId,
    pub updated_at: DateTime<Utc>,
}

/// Key-value store for the session partitions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the JSON document stored in a partition.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load(&self, partition: Partition) -> Result<Option<StoredPartition>, StorageError>;

    /// Replace the document stored in a partition and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be stored.
    async fn save(
        &self,
        partition: Partition,
        payload: &str,
        origin: InstanceId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Remove a partition's document and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn clear(&self, partition: Partition, origin: InstanceId) -> Result<(), StorageError>;

    /// Subscribe to change notifications for every partition.
    fn subscribe(&self) -> broadcast::Receiver<PartitionChange>;
}

pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Simple in-memory store for tests and ephemeral runs.
#[derive(Clone)]
pub struct InMemorySessionStore {
    partitions: Arc<Mutex<HashMap<Partition, StoredPartition>>>,
    changes: broadcast::Sender<PartitionChange>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            partitions: Arc::new(Mutex::new(HashMap::new())),
            changes,
        }
    }

    fn notify(&self, partition: Partition, origin: InstanceId) {
        // No subscribers is fine.
        let _ = self.changes.send(PartitionChange { partition, origin });
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, partition: Partition) -> Result<Option<StoredPartition>, StorageError> {
        let guard = self
            .partitions
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&partition).cloned())
    }

    async fn save(
        &self,
        partition: Partition,
        payload: &str,
        origin: InstanceId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        {
            let mut guard = self
                .partitions
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.insert(
                partition,
                StoredPartition {
                    payload: payload.to_owned(),
                    origin,
                    updated_at: at,
                },
            );
        }
        self.notify(partition, origin);
        Ok(())
    }

    async fn clear(&self, partition: Partition, origin: InstanceId) -> Result<(), StorageError> {
        {
            let mut guard = self
                .partitions
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.remove(&partition);
        }
        self.notify(partition, origin);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PartitionChange> {
        self.changes.subscribe()
    }
}

/// Session store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn partitions_are_independent() {
        let store = InMemorySessionStore::new();
        let me = InstanceId::random();
        store
            .save(Partition::Exam, "{\"a\":1}", me, fixed_now())
            .await
            .unwrap();
        assert!(store.load(Partition::Study).await.unwrap().is_none());
        let exam = store.load(Partition::Exam).await.unwrap().unwrap();
        assert_eq!(exam.payload, "{\"a\":1}");
        assert_eq!(exam.origin, me);

        store.clear(Partition::Exam, me).await.unwrap();
        assert!(store.load(Partition::Exam).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_are_broadcast_with_origin() {
        let store = InMemorySessionStore::new();
        let mut rx = store.subscribe();
        let writer = InstanceId::random();
        store
            .save(Partition::Quiz, "{}", writer, fixed_now())
            .await
            .unwrap();
        store.clear(Partition::Study, writer).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.partition, Partition::Quiz);
        assert_eq!(first.origin, writer);
        assert_eq!(rx.recv().await.unwrap().partition, Partition::Study);
    }

    #[test]
    fn partitions_have_distinct_names() {
        let mut names: Vec<_> = Partition::ALL.iter().map(|p| p.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 3);
        assert_eq!(Partition::for_mode(QuizMode::Study), Partition::Study);
        assert_eq!(Partition::for_mode(QuizMode::Exam), Partition::Exam);
    }
}
