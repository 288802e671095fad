//! Escrow record types for Pactum
//!
//! The `EscrowRecord` is the aggregate root: one tracked agreement between a
//! payer and a payee, optionally mediated by an arbiter, with a timeout-based
//! default resolution. Participants and chat messages are embedded in the
//! record; no other entity references them.

use crate::{ActorId, Amount, EscrowError, EscrowId, MessageId, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an escrow record
///
/// `PayerFunded` and `PayeeConfirmedItem` are near-synonyms (one side has
/// performed its funding step) kept distinct for audit granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Created, neither side has funded
    PendingFunding,
    /// Payer has funded, payee has not
    PayerFunded,
    /// Payee has funded (and thereby confirmed the item is ready)
    PayeeConfirmedItem,
    /// Both sides funded
    Active,
    /// One side has confirmed completion, waiting on the other
    AwaitingParticipantAction,
    /// A participant has contested the outcome
    DisputeInitiated,
    /// Parties are submitting evidence for arbiter review
    EvidenceSubmission,
    /// Arbiter is reviewing the dispute
    ArbiterReview,
    /// Funds released to the payee
    CompletedReleased,
    /// Funds refunded to the payer
    CompletedRefunded,
    /// Funds split between the parties
    CompletedSplit,
    /// The timelock elapsed and the default outcome fired
    TimelockDefaultTriggered,
    /// Deleted before any funding occurred
    CancelledUnfunded,
}

impl EscrowStatus {
    /// Check if this is a terminal status (no outgoing transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::CompletedReleased
                | Self::CompletedRefunded
                | Self::CompletedSplit
                | Self::TimelockDefaultTriggered
                | Self::CancelledUnfunded
        )
    }

    /// Check if the deadline timer is meaningful in this status
    pub fn timer_applies(&self) -> bool {
        !self.is_terminal()
    }

    /// Check if evidence submission is open (dispute statuses only)
    pub fn accepts_evidence(&self) -> bool {
        matches!(
            self,
            Self::DisputeInitiated | Self::EvidenceSubmission | Self::ArbiterReview
        )
    }

    /// Check if a dispute may be initiated from this status
    pub fn allows_dispute(&self) -> bool {
        matches!(
            self,
            Self::Active
                | Self::AwaitingParticipantAction
                | Self::PayerFunded
                | Self::PayeeConfirmedItem
        )
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PendingFunding => "Pending Funding",
            Self::PayerFunded => "Payer Funded",
            Self::PayeeConfirmedItem => "Payee Confirmed Item",
            Self::Active => "Active / Funded",
            Self::AwaitingParticipantAction => "Awaiting Participant Action",
            Self::DisputeInitiated => "Dispute Initiated",
            Self::EvidenceSubmission => "Evidence Submission Phase",
            Self::ArbiterReview => "Arbiter Review",
            Self::CompletedReleased => "Completed - Funds Released",
            Self::CompletedRefunded => "Completed - Funds Refunded",
            Self::CompletedSplit => "Completed - Funds Split",
            Self::TimelockDefaultTriggered => "Timelock Default Triggered",
            Self::CancelledUnfunded => "Cancelled (Unfunded)",
        }
    }
}

impl fmt::Display for EscrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pre-agreed resolution applied automatically when the deadline elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultOutcome {
    /// Full refund to the payer
    PayerRefund,
    /// 50/50 split between payer and payee
    Split5050,
    /// Full release to the payee
    PayeeFavor,
}

impl DefaultOutcome {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::PayerRefund => "Full Refund to Payer",
            Self::Split5050 => "50/50 Split (Payer/Payee)",
            Self::PayeeFavor => "Full Release to Payee",
        }
    }
}

impl fmt::Display for DefaultOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Decision recorded when an arbiter rules on a disputed record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArbiterRuling {
    /// Ruled in favor of the payer (refund)
    Payer,
    /// Ruled in favor of the payee (release)
    Payee,
    /// Ruled for a 50/50 split
    Split,
}

/// One side of the agreement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Acting party's identifier
    pub id: ActorId,
    /// Whether this side has committed its funds
    pub has_funded: bool,
    /// Whether this side has confirmed completion of its obligation
    pub has_confirmed: bool,
}

impl Participant {
    /// Create a participant with no steps performed
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            has_funded: false,
            has_confirmed: false,
        }
    }
}

/// An entry in the escrow's chronological chat log
///
/// Messages double as the evidentiary record: insertion order is significant
/// and entries are never reordered or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent the message
    pub sender_id: ActorId,
    /// Display label of the sender at send time
    pub sender_label: String,
    /// Message body
    pub text: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Whether the message is flagged for arbiter review
    pub is_evidence: bool,
}

impl ChatMessage {
    /// Create a new chat message
    pub fn new(
        sender_id: ActorId,
        sender_label: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        is_evidence: bool,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender_id,
            sender_label: sender_label.into(),
            text: text.into(),
            timestamp,
            is_evidence,
        }
    }
}

/// Which side the creator of a record takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiatorRole {
    /// The creator pays into the escrow
    Payer,
    /// The creator delivers the goods or service
    Payee,
}

/// Request to create an escrow record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEscrowRequest {
    /// Agreement title
    pub title: String,
    /// Agreement description
    pub description: String,
    /// Escrowed amount
    pub amount: Amount,
    /// Who is creating the record
    pub initiator_id: ActorId,
    /// Which side the initiator takes
    pub initiator_role: InitiatorRole,
    /// The other party
    pub counterparty_id: ActorId,
    /// Assigned neutral arbiter
    pub arbiter_id: ActorId,
    /// Resolution applied if the deadline elapses unresolved
    pub default_outcome: DefaultOutcome,
    /// Timelock duration in hours
    pub duration_hours: u32,
}

impl CreateEscrowRequest {
    /// Validate creation constraints
    ///
    /// The state machine never re-checks these; they hold from creation on.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(EscrowError::invalid_input("title", "must not be blank"));
        }
        if self.description.trim().is_empty() {
            return Err(EscrowError::invalid_input("description", "must not be blank"));
        }
        if !self.amount.is_positive() {
            return Err(EscrowError::invalid_input("amount", "must be positive"));
        }
        if self.duration_hours == 0 {
            return Err(EscrowError::invalid_input(
                "duration_hours",
                "must be at least 1",
            ));
        }
        if self.initiator_id == self.counterparty_id {
            return Err(EscrowError::invalid_input(
                "counterparty_id",
                "an escrow must be between two different parties",
            ));
        }
        Ok(())
    }
}

/// The persisted state of one agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscrowRecord {
    /// Unique record ID, immutable
    pub id: EscrowId,
    /// Title, immutable after creation
    pub title: String,
    /// Description, immutable after creation
    pub description: String,
    /// Escrowed amount, immutable
    pub amount: Amount,
    /// Who created the record, immutable
    pub initiator_id: ActorId,
    /// The paying side
    pub payer: Participant,
    /// The delivering side
    pub payee: Participant,
    /// Assigned neutral party, fixed at creation
    pub arbiter_id: ActorId,
    /// Set true exactly once when a dispute is initiated; never reverts
    pub arbiter_involved: bool,
    /// Current lifecycle status; mutated only by the action processor
    pub status: EscrowStatus,
    /// Timeout resolution policy, fixed at creation
    pub default_outcome: DefaultOutcome,
    /// Timelock duration in hours, fixed at creation
    pub duration_hours: u32,
    /// Creation instant
    pub created_at: DateTime<Utc>,
    /// Rewritten on every successful transition
    pub updated_at: DateTime<Utc>,
    /// Chronological, append-only message log
    pub chat_log: Vec<ChatMessage>,
    /// Why the dispute was opened, if one was
    pub dispute_reason: Option<String>,
    /// Narrative attached when the record reaches a resolved terminal status
    pub resolution_details: Option<String>,
    /// Arbiter's decision, if the record was resolved by ruling
    pub arbiter_ruling: Option<ArbiterRuling>,
}

impl EscrowRecord {
    /// Build a fresh record from a validated creation request
    pub fn from_request(request: CreateEscrowRequest, now: DateTime<Utc>) -> Result<Self> {
        request.validate()?;

        let (payer_id, payee_id) = match request.initiator_role {
            InitiatorRole::Payer => (request.initiator_id.clone(), request.counterparty_id),
            InitiatorRole::Payee => (request.counterparty_id, request.initiator_id.clone()),
        };

        Ok(Self {
            id: EscrowId::new(),
            title: request.title,
            description: request.description,
            amount: request.amount,
            initiator_id: request.initiator_id,
            payer: Participant::new(payer_id),
            payee: Participant::new(payee_id),
            arbiter_id: request.arbiter_id,
            arbiter_involved: false,
            status: EscrowStatus::PendingFunding,
            default_outcome: request.default_outcome,
            duration_hours: request.duration_hours,
            created_at: now,
            updated_at: now,
            chat_log: Vec::new(),
            dispute_reason: None,
            resolution_details: None,
            arbiter_ruling: None,
        })
    }

    /// The instant the timelock elapses
    pub fn deadline(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(self.duration_hours as i64)
    }

    /// Check if both sides have committed funds
    pub fn both_funded(&self) -> bool {
        self.payer.has_funded && self.payee.has_funded
    }

    /// Check if both sides have confirmed completion
    pub fn both_confirmed(&self) -> bool {
        self.payer.has_confirmed && self.payee.has_confirmed
    }
}
