//! Typed access to the session partitions.
//!
//! Documents are JSON so the layout stays readable and stable across
//! backends.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use quiz_core::model::{Quiz, QuizMode, SessionState};

use crate::repository::{InstanceId, Partition, PartitionChange, SessionStore, StorageError};

/// One view's handle on the shared partitions, stamped with its `InstanceId`.
#[derive(Clone)]
pub struct SessionPartitions {
    store: Arc<dyn SessionStore>,
    instance: InstanceId,
}

impl SessionPartitions {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            instance: InstanceId::random(),
        }
    }

    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// Load the persisted session for a mode, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a document that no longer parses.
    pub async fn load_session(&self, mode: QuizMode) -> Result<Option<SessionState>, StorageError> {
        self.load_json(Partition::for_mode(mode)).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be encoded or stored.
    pub async fn save_session(
        &self,
        state: &SessionState,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.save_json(Partition::for_mode(state.mode()), state, at)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear_session(&self, mode: QuizMode) -> Result<(), StorageError> {
        self.store
            .clear(Partition::for_mode(mode), self.instance)
            .await
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for a document that no longer parses.
    pub async fn load_quiz(&self) -> Result<Option<Quiz>, StorageError> {
        self.load_json(Partition::Quiz).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be encoded or stored.
    pub async fn save_quiz(&self, quiz: &Quiz, at: DateTime<Utc>) -> Result<(), StorageError> {
        self.save_json(Partition::Quiz, quiz, at).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear_quiz(&self) -> Result<(), StorageError> {
        self.store.clear(Partition::Quiz, self.instance).await
    }

    /// Changes made by other instances only.
    #[must_use]
    pub fn subscribe(&self) -> ForeignChanges {
        ForeignChanges {
            rx: self.store.subscribe(),
            instance: self.instance,
        }
    }

    async fn load_json<T: DeserializeOwned>(
        &self,
        partition: Partition,
    ) -> Result<Option<T>, StorageError> {
        let Some(stored) = self.store.load(partition).await? else {
            return Ok(None);
        };
        serde_json::from_str(&stored.payload)
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_json<T: Serialize + Sync>(
        &self,
        partition: Partition,
        value: &T,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let payload = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.store.save(partition, &payload, self.instance, at).await
    }
}

/// Change feed filtered to writes from other instances.
pub struct ForeignChanges {
    rx: broadcast::Receiver<PartitionChange>,
    instance: InstanceId,
}

impl ForeignChanges {
    /// Wait for the next change made by another instance.
    ///
    /// Returns `None` once the store is gone. A lagging receiver reports the
    /// affected partitions as unknown by yielding every partition.
    pub async fn next(&mut self) -> Option<Vec<Partition>> {
        loop {
            match self.rx.recv().await {
                Ok(change) if change.origin == self.instance => {}
                Ok(change) => return Some(vec![change.partition]),
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    return Some(Partition::ALL.to_vec());
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemorySessionStore;
    use quiz_core::model::QuizId;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn session_state_round_trips_through_partition() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let partitions = SessionPartitions::new(store);
        let state = SessionState::new(QuizId::new("quiz-1"), QuizMode::Exam);
        partitions.save_session(&state, fixed_now()).await.unwrap();

        assert_eq!(
            partitions.load_session(QuizMode::Exam).await.unwrap(),
            Some(state)
        );
        assert_eq!(partitions.load_session(QuizMode::Study).await.unwrap(), None);
    }

    #[tokio::test]
    async fn own_writes_are_filtered_from_change_feed() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let window_a = SessionPartitions::new(Arc::clone(&store));
        let window_b = SessionPartitions::new(store);
        let mut feed_a = window_a.subscribe();

        window_a.clear_quiz().await.unwrap();
        window_b.clear_session(QuizMode::Study).await.unwrap();

        assert_eq!(feed_a.next().await, Some(vec![Partition::Study]));
    }

    #[tokio::test]
    async fn corrupt_document_is_a_serialization_error() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .save(Partition::Quiz, "not json", InstanceId::random(), fixed_now())
            .await
            .unwrap();
        let partitions = SessionPartitions::new(store);
        assert!(matches!(
            partitions.load_quiz().await,
            Err(StorageError::Serialization(_))
        ));
    }
}
