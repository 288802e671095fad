//! Action processor
//!
//! The single write path for escrow records. Every mutation arrives as an
//! [`ActionCommand`], is serialized per record ID, checked against the guard
//! table, and either persisted as one atomic read-modify-write or rejected
//! with no trace.
//!
//! Guard evaluation order within a handler is fixed: actor first, then
//! status, then idempotency. Rejections never mutate the stored record, so
//! callers may retry retriable errors with the same command.

use std::sync::Arc;

use dashmap::DashMap;
use pactum_types::{
    ActionCommand, ActionOutcome, ActorId, ActorRole, ArbiterRuling, ChatMessage,
    CreateEscrowRequest, EscrowAction, EscrowError, EscrowId, EscrowRecord, EscrowStatus, Notice,
    OverrideBeneficiary, Principal, Result,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::emergency;
use crate::resolver;
use crate::roles::RoleConfig;
use crate::timer;
use crate::traits::{Clock, EscrowStore, FundingBroadcaster, NotificationSink};

/// Serialized, guarded entry point for all escrow mutations.
pub struct ActionProcessor {
    store: Arc<dyn EscrowStore>,
    broadcaster: Arc<dyn FundingBroadcaster>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    roles: RoleConfig,
    locks: DashMap<EscrowId, Arc<Mutex<()>>>,
}

impl ActionProcessor {
    /// Wire a processor to its collaborators.
    pub fn new(
        store: Arc<dyn EscrowStore>,
        broadcaster: Arc<dyn FundingBroadcaster>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        roles: RoleConfig,
    ) -> Self {
        Self {
            store,
            broadcaster,
            notifier,
            clock,
            roles,
            locks: DashMap::new(),
        }
    }

    /// Validate and persist a new escrow record.
    pub async fn create_escrow(&self, request: CreateEscrowRequest) -> Result<EscrowRecord> {
        let record = EscrowRecord::from_request(request, self.clock.now())?;
        self.store.save(&record).await?;

        info!(escrow_id = %record.id, title = %record.title, "escrow created");
        self.notifier
            .emit(Notice::success(format!("Escrow \"{}\" created.", record.title)))
            .await;

        Ok(record)
    }

    /// Fetch one record.
    pub async fn get_escrow(&self, id: &EscrowId) -> Result<EscrowRecord> {
        self.store
            .load(id)
            .await?
            .ok_or_else(|| EscrowError::not_found(id.to_string()))
    }

    /// Snapshot of every record in the store.
    pub async fn list_escrows(&self) -> Result<Vec<EscrowRecord>> {
        self.store.list_all().await
    }

    /// Apply one command to one record.
    ///
    /// Commands against the same record are applied strictly one at a time;
    /// commands against different records run independently.
    pub async fn apply(&self, command: ActionCommand) -> Result<ActionOutcome> {
        let ActionCommand {
            escrow_id,
            principal,
            action,
        } = command;

        let lock = self.record_lock(&escrow_id);
        let _serial = lock.lock().await;

        let action_kind = action.kind();
        let result = match self.store.load(&escrow_id).await {
            Ok(Some(record)) => self.dispatch(record, &principal, action).await,
            Ok(None) => Err(EscrowError::not_found(escrow_id.to_string())),
            Err(err) => Err(err),
        };

        match &result {
            Ok(ActionOutcome::Transitioned(updated)) => {
                info!(
                    escrow_id = %escrow_id,
                    action = action_kind,
                    status = %updated.status,
                    "action applied"
                );
            }
            Ok(ActionOutcome::Removed(id)) => {
                self.locks.remove(id);
                info!(escrow_id = %id, action = action_kind, "escrow removed");
            }
            Err(err) => {
                debug!(
                    escrow_id = %escrow_id,
                    action = action_kind,
                    error = %err,
                    "action rejected"
                );
                // Rejections surface to participants too, not just to the caller.
                self.notifier.emit(Notice::error(err.to_string())).await;
            }
        }

        result
    }

    fn record_lock(&self, id: &EscrowId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn dispatch(
        &self,
        record: EscrowRecord,
        principal: &Principal,
        action: EscrowAction,
    ) -> Result<ActionOutcome> {
        match action {
            EscrowAction::FundAsPayer { signed_tx } => {
                let actor = require_actor(principal)?;
                self.fund_as_payer(record, actor, signed_tx).await
            }
            EscrowAction::FundAsPayee { signed_tx } => {
                let actor = require_actor(principal)?;
                self.fund_as_payee(record, actor, signed_tx).await
            }
            EscrowAction::ConfirmAsPayer => {
                let actor = require_actor(principal)?;
                self.confirm_as_payer(record, actor).await
            }
            EscrowAction::ConfirmAsPayee => {
                let actor = require_actor(principal)?;
                self.confirm_as_payee(record, actor).await
            }
            EscrowAction::InitiateDispute { reason } => {
                let actor = require_actor(principal)?;
                self.initiate_dispute(record, actor, reason).await
            }
            EscrowAction::RuleForPayer => {
                let actor = require_actor(principal)?;
                self.rule(record, actor, ArbiterRuling::Payer).await
            }
            EscrowAction::RuleForPayee => {
                let actor = require_actor(principal)?;
                self.rule(record, actor, ArbiterRuling::Payee).await
            }
            EscrowAction::RuleForSplit => {
                let actor = require_actor(principal)?;
                self.rule(record, actor, ArbiterRuling::Split).await
            }
            EscrowAction::TimelockExpiry => {
                if *principal != Principal::System {
                    return Err(EscrowError::wrong_actor(
                        "Only the scheduler can trigger a timelock expiry",
                    ));
                }
                self.timelock_expiry(record).await
            }
            EscrowAction::SendMessage { text, sender_label } => {
                let actor = require_actor(principal)?;
                self.send_message(record, actor, text, sender_label).await
            }
            EscrowAction::SubmitEvidence { text, sender_label } => {
                let actor = require_actor(principal)?;
                self.submit_evidence(record, actor, text, sender_label).await
            }
            EscrowAction::EmergencyOverride {
                beneficiary,
                justification,
            } => {
                let actor = require_actor(principal)?;
                self.emergency_override(record, actor, beneficiary, justification)
                    .await
            }
            EscrowAction::DeleteUnfunded => {
                let actor = require_actor(principal)?;
                self.delete_unfunded(record, actor).await
            }
        }
    }

    // ── Funding ──────────────────────────────────────────────────────────────

    async fn fund_as_payer(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        signed_tx: Option<String>,
    ) -> Result<ActionOutcome> {
        if self.roles.resolve(&record, actor) != ActorRole::Payer {
            return Err(EscrowError::wrong_actor("Only the payer can fund this escrow"));
        }
        if !matches!(
            record.status,
            EscrowStatus::PendingFunding | EscrowStatus::PayeeConfirmedItem
        ) {
            return Err(EscrowError::wrong_status(format!(
                "Cannot fund from status '{}'",
                record.status
            )));
        }
        if record.payer.has_funded {
            return Err(EscrowError::already_done("Payer has already funded this escrow"));
        }

        self.broadcast_if_signed(signed_tx).await?;

        record.payer.has_funded = true;
        record.status = if record.payee.has_funded {
            EscrowStatus::Active
        } else {
            EscrowStatus::PayerFunded
        };

        let notice = Notice::success(format!("Payer funded escrow: \"{}\"", record.title));
        self.commit(record, notice).await
    }

    async fn fund_as_payee(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        signed_tx: Option<String>,
    ) -> Result<ActionOutcome> {
        if self.roles.resolve(&record, actor) != ActorRole::Payee {
            return Err(EscrowError::wrong_actor("Only the payee can fund this escrow"));
        }
        if !matches!(
            record.status,
            EscrowStatus::PendingFunding | EscrowStatus::PayerFunded
        ) {
            return Err(EscrowError::wrong_status(format!(
                "Cannot fund from status '{}'",
                record.status
            )));
        }
        if record.payee.has_funded {
            return Err(EscrowError::already_done("Payee has already funded this escrow"));
        }

        self.broadcast_if_signed(signed_tx).await?;

        // Funding by the payee doubles as confirmation that the item is ready.
        record.payee.has_funded = true;
        record.payee.has_confirmed = true;
        record.status = if record.payer.has_funded {
            EscrowStatus::Active
        } else {
            EscrowStatus::PayeeConfirmedItem
        };

        let notice = Notice::success(format!(
            "Payee funded & confirmed item for escrow: \"{}\"",
            record.title
        ));
        self.commit(record, notice).await
    }

    async fn broadcast_if_signed(&self, signed_tx: Option<String>) -> Result<()> {
        let payload = match signed_tx {
            Some(payload) => payload,
            None => return Ok(()),
        };

        // A failed broadcast bubbles up untouched; `apply` notifies on rejection.
        let receipt = self.broadcaster.broadcast(&payload).await?;
        let reference = receipt.reference.unwrap_or_else(|| "(n/a)".to_string());
        self.notifier
            .emit(Notice::info(format!(
                "Transaction broadcast accepted. Reference: {reference}"
            )))
            .await;
        Ok(())
    }

    // ── Confirmation ─────────────────────────────────────────────────────────

    async fn confirm_as_payer(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
    ) -> Result<ActionOutcome> {
        if self.roles.resolve(&record, actor) != ActorRole::Payer {
            return Err(EscrowError::wrong_actor(
                "Only the payer can confirm satisfaction",
            ));
        }
        if !matches!(
            record.status,
            EscrowStatus::Active | EscrowStatus::AwaitingParticipantAction
        ) {
            return Err(EscrowError::wrong_status(format!(
                "Cannot confirm from status '{}'",
                record.status
            )));
        }
        if record.payer.has_confirmed {
            return Err(EscrowError::already_done(
                "Payer has already confirmed satisfaction",
            ));
        }

        record.payer.has_confirmed = true;
        if record.payee.has_confirmed {
            record.status = EscrowStatus::CompletedReleased;
            record.resolution_details = Some(resolver::mutual_agreement_narrative(true));
        } else {
            record.status = EscrowStatus::AwaitingParticipantAction;
        }

        let notice = Notice::success(format!(
            "Payer confirmed satisfaction for: \"{}\"",
            record.title
        ));
        self.commit(record, notice).await
    }

    async fn confirm_as_payee(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
    ) -> Result<ActionOutcome> {
        if self.roles.resolve(&record, actor) != ActorRole::Payee {
            return Err(EscrowError::wrong_actor(
                "Only the payee can confirm delivery",
            ));
        }
        if !matches!(
            record.status,
            EscrowStatus::Active | EscrowStatus::AwaitingParticipantAction
        ) {
            return Err(EscrowError::wrong_status(format!(
                "Cannot confirm from status '{}'",
                record.status
            )));
        }
        if record.payee.has_confirmed {
            return Err(EscrowError::already_done(
                "Payee has already confirmed delivery",
            ));
        }

        record.payee.has_confirmed = true;
        if record.payer.has_confirmed {
            record.status = EscrowStatus::CompletedReleased;
            record.resolution_details = Some(resolver::mutual_agreement_narrative(false));
        } else {
            record.status = EscrowStatus::AwaitingParticipantAction;
        }

        let notice = Notice::success(format!(
            "Payee confirmed delivery for: \"{}\"",
            record.title
        ));
        self.commit(record, notice).await
    }

    // ── Dispute and ruling ───────────────────────────────────────────────────

    async fn initiate_dispute(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        reason: Option<String>,
    ) -> Result<ActionOutcome> {
        let role = self.roles.resolve(&record, actor);
        if !matches!(role, ActorRole::Payer | ActorRole::Payee) {
            return Err(EscrowError::wrong_actor(
                "Only a participant can initiate a dispute",
            ));
        }
        if !record.status.allows_dispute() {
            return Err(EscrowError::wrong_status(format!(
                "Cannot initiate a dispute from status '{}'",
                record.status
            )));
        }
        if record.arbiter_involved {
            return Err(EscrowError::already_done(
                "A dispute has already been initiated for this escrow",
            ));
        }

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "Dispute initiated by user.".to_string());

        record.arbiter_involved = true;
        record.status = EscrowStatus::DisputeInitiated;
        record.dispute_reason = Some(reason);

        let notice = Notice::warning(format!("Dispute initiated for: \"{}\"", record.title));
        self.commit(record, notice).await
    }

    async fn rule(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        ruling: ArbiterRuling,
    ) -> Result<ActionOutcome> {
        if self.roles.resolve(&record, actor) != ActorRole::Arbiter {
            return Err(EscrowError::wrong_actor(
                "Only the assigned arbiter can rule on this escrow",
            ));
        }
        if !record.arbiter_involved
            || !matches!(
                record.status,
                EscrowStatus::DisputeInitiated
                    | EscrowStatus::EvidenceSubmission
                    | EscrowStatus::ArbiterReview
            )
        {
            return Err(EscrowError::wrong_status(format!(
                "Cannot rule from status '{}'",
                record.status
            )));
        }

        let (status, narrative) = resolver::ruling_resolution(ruling);
        record.status = status;
        record.resolution_details = Some(narrative);
        record.arbiter_ruling = Some(ruling);

        let notice = match ruling {
            ArbiterRuling::Payer => {
                Notice::success(format!("Arbiter ruled for Payer in: \"{}\"", record.title))
            }
            ArbiterRuling::Payee => {
                Notice::success(format!("Arbiter ruled for Payee in: \"{}\"", record.title))
            }
            ArbiterRuling::Split => Notice::success(format!(
                "Arbiter ruled for 50/50 split in: \"{}\"",
                record.title
            )),
        };
        self.commit(record, notice).await
    }

    // ── Timelock ─────────────────────────────────────────────────────────────

    async fn timelock_expiry(&self, mut record: EscrowRecord) -> Result<ActionOutcome> {
        if record.status.is_terminal() {
            return Err(EscrowError::wrong_status(format!(
                "Escrow is already resolved with status '{}'",
                record.status
            )));
        }
        if !timer::evaluate(&record, self.clock.now()).is_expired() {
            return Err(EscrowError::wrong_status("Timelock has not expired yet"));
        }

        record.status = EscrowStatus::TimelockDefaultTriggered;
        record.resolution_details = Some(resolver::timeout_narrative(record.default_outcome));

        let notice = Notice::warning(format!(
            "Timelock expired, default outcome applied for: \"{}\"",
            record.title
        ));
        self.commit(record, notice).await
    }

    // ── Chat and evidence ────────────────────────────────────────────────────

    async fn send_message(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        text: String,
        sender_label: String,
    ) -> Result<ActionOutcome> {
        let role = self.roles.resolve(&record, actor);
        if !matches!(role, ActorRole::Payer | ActorRole::Payee | ActorRole::Arbiter) {
            return Err(EscrowError::wrong_actor(
                "Only escrow participants can send messages",
            ));
        }
        if record.status.is_terminal() {
            return Err(EscrowError::wrong_status(
                "Chat is closed once an escrow is resolved",
            ));
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(EscrowError::invalid_input("text", "must not be blank"));
        }

        record.chat_log.push(ChatMessage::new(
            actor.clone(),
            sender_label,
            text,
            self.clock.now(),
            false,
        ));

        let notice = Notice::info(format!("Message added to: \"{}\"", record.title));
        self.commit(record, notice).await
    }

    async fn submit_evidence(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        text: String,
        sender_label: String,
    ) -> Result<ActionOutcome> {
        let role = self.roles.resolve(&record, actor);
        if !matches!(role, ActorRole::Payer | ActorRole::Payee) {
            return Err(EscrowError::wrong_actor(
                "Only a participant can submit evidence",
            ));
        }
        if !record.status.accepts_evidence() {
            return Err(EscrowError::wrong_status(format!(
                "Evidence can only be submitted during a dispute, not in status '{}'",
                record.status
            )));
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(EscrowError::invalid_input("text", "must not be blank"));
        }

        record.chat_log.push(ChatMessage::new(
            actor.clone(),
            sender_label,
            text,
            self.clock.now(),
            true,
        ));

        let notice = Notice::info(format!("Evidence submitted for: \"{}\"", record.title));
        self.commit(record, notice).await
    }

    // ── Override and deletion ────────────────────────────────────────────────

    async fn emergency_override(
        &self,
        mut record: EscrowRecord,
        actor: &ActorId,
        beneficiary: OverrideBeneficiary,
        justification: String,
    ) -> Result<ActionOutcome> {
        if !self.roles.is_administrator(actor) {
            return Err(EscrowError::wrong_actor(
                "Only an administrator can apply an emergency override",
            ));
        }

        emergency::apply_override(&mut record, actor, beneficiary, &justification)?;

        let notice = Notice::warning(format!(
            "Emergency override applied to: \"{}\"",
            record.title
        ));
        self.commit(record, notice).await
    }

    async fn delete_unfunded(
        &self,
        record: EscrowRecord,
        actor: &ActorId,
    ) -> Result<ActionOutcome> {
        if record.initiator_id != *actor {
            return Err(EscrowError::wrong_actor(
                "Only the initiator can delete an escrow",
            ));
        }
        if record.status != EscrowStatus::PendingFunding
            || record.payer.has_funded
            || record.payee.has_funded
        {
            return Err(EscrowError::wrong_status(format!(
                "Only unfunded escrows can be deleted, status is '{}'",
                record.status
            )));
        }

        self.store.remove(&record.id).await?;
        self.notifier
            .emit(Notice::warning(format!(
                "Escrow \"{}\" deleted.",
                record.title
            )))
            .await;

        Ok(ActionOutcome::Removed(record.id))
    }

    async fn commit(&self, mut record: EscrowRecord, notice: Notice) -> Result<ActionOutcome> {
        record.updated_at = self.clock.now();
        self.store.save(&record).await?;
        self.notifier.emit(notice).await;
        Ok(ActionOutcome::Transitioned(record))
    }
}

fn require_actor(principal: &Principal) -> Result<&ActorId> {
    principal.actor_id().ok_or_else(|| {
        EscrowError::wrong_actor("The system principal can only trigger a timelock expiry")
    })
}
