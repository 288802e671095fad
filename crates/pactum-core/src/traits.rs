//! Collaborator seams for the action processor
//!
//! The state machine core depends only on these traits, never on a concrete
//! store, settlement daemon, or notification channel. Simulated
//! implementations live alongside the traits so the engine runs identically
//! with or without real infrastructure behind it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pactum_types::{EscrowId, EscrowRecord, Notice, Result};
use tracing::{error, info, warn};

// ── Persistence ───────────────────────────────────────────────────────────────

/// Durable home of escrow records, keyed by ID.
///
/// `save` is an upsert: the processor calls it both for newly created records
/// and after every transition. Implementations map their own failures to
/// `EscrowError::PersistenceFailed`.
#[async_trait]
pub trait EscrowStore: Send + Sync {
    /// Fetch one record, `None` if no record exists under the ID.
    async fn load(&self, id: &EscrowId) -> Result<Option<EscrowRecord>>;

    /// Insert or replace a record under its own ID.
    async fn save(&self, record: &EscrowRecord) -> Result<()>;

    /// Remove a record. Removing an absent ID is an error.
    async fn remove(&self, id: &EscrowId) -> Result<()>;

    /// Snapshot of every stored record, in no particular order.
    async fn list_all(&self) -> Result<Vec<EscrowRecord>>;
}

// ── Settlement broadcast ──────────────────────────────────────────────────────

/// Acknowledgement from the settlement layer for an accepted broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReceipt {
    /// Transaction reference assigned by the settlement layer, if any.
    pub reference: Option<String>,
}

/// Hands signed settlement transactions to the funding rail.
///
/// A rejected broadcast must leave no trace: the processor only mutates the
/// record after `broadcast` returns `Ok`.
#[async_trait]
pub trait FundingBroadcaster: Send + Sync {
    /// Submit a signed transaction payload. Errors map to
    /// `EscrowError::BroadcastFailed`.
    async fn broadcast(&self, signed_tx: &str) -> Result<BroadcastReceipt>;
}

/// Broadcaster that accepts everything and mints sequential references.
///
/// Stands in for the settlement daemon in demos and tests. Construct with
/// [`SimulatedBroadcaster::rejecting`] to exercise the failure path instead.
pub struct SimulatedBroadcaster {
    sequence: AtomicU64,
    reject_reason: Option<String>,
}

impl SimulatedBroadcaster {
    /// Broadcaster that accepts every payload.
    pub fn new() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            reject_reason: None,
        }
    }

    /// Broadcaster that refuses every payload with the given reason.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            reject_reason: Some(reason.into()),
        }
    }
}

impl Default for SimulatedBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundingBroadcaster for SimulatedBroadcaster {
    async fn broadcast(&self, signed_tx: &str) -> Result<BroadcastReceipt> {
        if let Some(reason) = &self.reject_reason {
            warn!(reason = %reason, "simulated broadcast rejected");
            return Err(pactum_types::EscrowError::broadcast_failed(reason.clone()));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let reference = format!("sim-tx-{seq:06}");
        info!(reference = %reference, bytes = signed_tx.len(), "simulated broadcast accepted");
        Ok(BroadcastReceipt {
            reference: Some(reference),
        })
    }
}

// ── Notifications ─────────────────────────────────────────────────────────────

/// Fire-and-forget delivery of participant-facing notices.
///
/// Delivery failures are the sink's problem; the processor never rolls back a
/// transition because a notice was lost.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notice.
    async fn emit(&self, notice: Notice);
}

/// Sink that writes notices to the tracing log, one event per notice.
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn emit(&self, notice: Notice) {
        match notice.severity {
            pactum_types::Severity::Info | pactum_types::Severity::Success => {
                info!(severity = %notice.severity, "{}", notice.message);
            }
            pactum_types::Severity::Warning => {
                warn!(severity = %notice.severity, "{}", notice.message);
            }
            pactum_types::Severity::Error => {
                error!(severity = %notice.severity, "{}", notice.message);
            }
        }
    }
}

// ── Time ──────────────────────────────────────────────────────────────────────

/// Source of the current instant.
///
/// Every timestamp and deadline comparison in the engine goes through this
/// trait, so deadline behavior is testable without sleeping.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    instant: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(start),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self
            .instant
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = instant;
    }

    /// Move forward by a duration.
    pub fn advance(&self, by: Duration) {
        let mut guard = self
            .instant
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self
            .instant
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_broadcast_mints_references() {
        let broadcaster = SimulatedBroadcaster::new();

        let first = broadcaster.broadcast("payload-a").await.unwrap();
        let second = broadcaster.broadcast("payload-b").await.unwrap();

        assert_eq!(first.reference.as_deref(), Some("sim-tx-000001"));
        assert_eq!(second.reference.as_deref(), Some("sim-tx-000002"));
    }

    #[tokio::test]
    async fn rejecting_broadcaster_fails_every_payload() {
        let broadcaster = SimulatedBroadcaster::rejecting("daemon offline");

        let err = broadcaster.broadcast("payload").await.unwrap_err();
        assert_eq!(err.error_code(), "BROADCAST_FAILED");
        assert!(err.is_retriable());
    }

    #[test]
    fn manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), start + Duration::hours(2));

        let later = start + Duration::days(3);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
