//! In-memory escrow store
//!
//! Default store for demos and tests. Records live in a `HashMap` behind an
//! async `RwLock`; the processor's per-record serialization happens above
//! this layer, so the store itself only needs map-level consistency.

use std::collections::HashMap;

use async_trait::async_trait;
use pactum_types::{EscrowError, EscrowId, EscrowRecord, Result};
use tokio::sync::RwLock;
use tracing::debug;

use pactum_core::EscrowStore;

/// Process-local implementation of [`EscrowStore`].
pub struct MemoryStore {
    records: RwLock<HashMap<EscrowId, EscrowRecord>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Check if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EscrowStore for MemoryStore {
    async fn load(&self, id: &EscrowId) -> Result<Option<EscrowRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &EscrowRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        debug!(escrow_id = %record.id, status = %record.status, "record saved");
        Ok(())
    }

    async fn remove(&self, id: &EscrowId) -> Result<()> {
        match self.records.write().await.remove(id) {
            Some(_) => {
                debug!(escrow_id = %id, "record removed");
                Ok(())
            }
            None => Err(EscrowError::not_found(id.to_string())),
        }
    }

    async fn list_all(&self) -> Result<Vec<EscrowRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pactum_types::{
        ActorId, Amount, CreateEscrowRequest, DefaultOutcome, EscrowStatus, InitiatorRole,
    };

    fn create_test_record() -> EscrowRecord {
        let request = CreateEscrowRequest {
            title: "Storage fixture".to_string(),
            description: "Round trip".to_string(),
            amount: Amount::from_human(5.0),
            initiator_id: ActorId::new(),
            initiator_role: InitiatorRole::Payer,
            counterparty_id: ActorId::new(),
            arbiter_id: ActorId::new(),
            default_outcome: DefaultOutcome::Split5050,
            duration_hours: 48,
        };
        EscrowRecord::from_request(request, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let store = MemoryStore::new();
        let record = create_test_record();

        assert!(store.load(&record.id).await.unwrap().is_none());

        store.save(&record).await.unwrap();
        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryStore::new();
        let mut record = create_test_record();

        store.save(&record).await.unwrap();
        record.status = EscrowStatus::PayerFunded;
        record.payer.has_funded = true;
        store.save(&record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, EscrowStatus::PayerFunded);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryStore::new();
        let record = create_test_record();
        store.save(&record).await.unwrap();

        store.remove(&record.id).await.unwrap();
        assert!(store.is_empty().await);

        let err = store.remove(&record.id).await.unwrap_err();
        assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_list_all() {
        let store = MemoryStore::new();
        let a = create_test_record();
        let b = create_test_record();
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|r| r.id == a.id));
        assert!(all.iter().any(|r| r.id == b.id));
    }
}
