//! Shared fixtures for the crate's unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pactum_types::{
    ActorId, Amount, CreateEscrowRequest, DefaultOutcome, EscrowId, EscrowRecord, InitiatorRole,
    Notice, Result,
};
use tokio::sync::RwLock;

use crate::traits::{EscrowStore, NotificationSink};

/// Minimal in-memory store for unit tests.
pub(crate) struct MapStore {
    records: RwLock<HashMap<EscrowId, EscrowRecord>>,
}

impl MapStore {
    pub(crate) fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EscrowStore for MapStore {
    async fn load(&self, id: &EscrowId) -> Result<Option<EscrowRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &EscrowRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, id: &EscrowId) -> Result<()> {
        self.records
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| pactum_types::EscrowError::not_found(id.to_string()))
    }

    async fn list_all(&self) -> Result<Vec<EscrowRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}

/// Notification sink that captures every notice for assertions.
#[derive(Default)]
pub(crate) struct CollectingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CollectingNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for CollectingNotifier {
    async fn emit(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Creation request between three fresh actors, payer initiating.
pub(crate) fn create_test_request() -> CreateEscrowRequest {
    CreateEscrowRequest {
        title: "Vintage camera".to_string(),
        description: "Film camera, shutter serviced".to_string(),
        amount: Amount::from_human(10.0),
        initiator_id: ActorId::new(),
        initiator_role: InitiatorRole::Payer,
        counterparty_id: ActorId::new(),
        arbiter_id: ActorId::new(),
        default_outcome: DefaultOutcome::PayerRefund,
        duration_hours: 1,
    }
}

pub(crate) fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
