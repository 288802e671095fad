//! Action vocabulary for the escrow state machine
//!
//! Every mutation of an escrow record is expressed as an `EscrowAction`
//! carried by an `ActionCommand`. The enum is closed: anything not listed
//! here cannot happen to a record.

use crate::{ActorId, EscrowId, EscrowRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role an actor holds relative to a specific escrow record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    /// The paying side
    Payer,
    /// The delivering side
    Payee,
    /// The assigned neutral party
    Arbiter,
    /// Platform operator with override powers
    Administrator,
    /// No relationship to the record
    Observer,
}

impl ActorRole {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Payer => "Payer",
            Self::Payee => "Payee",
            Self::Arbiter => "Arbiter",
            Self::Administrator => "Administrator",
            Self::Observer => "Observer",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Who is asking for an action
///
/// Timelock expiry is driven by the scheduler, not by any user, so it runs
/// under the `System` principal. Every other action names an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// A named actor (participant, arbiter, or administrator)
    Actor(ActorId),
    /// The timelock scheduler
    System,
}

impl Principal {
    /// The actor ID, if this is not the system principal
    pub fn actor_id(&self) -> Option<&ActorId> {
        match self {
            Self::Actor(id) => Some(id),
            Self::System => None,
        }
    }
}

/// Side an emergency override settles toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverrideBeneficiary {
    /// Settle as a refund to the payer
    Payer,
    /// Settle as a release to the payee
    Payee,
}

/// The closed set of operations a record can undergo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EscrowAction {
    /// Payer commits funds, optionally via a signed settlement transaction
    FundAsPayer {
        /// Signed transaction payload to broadcast before the transition
        signed_tx: Option<String>,
    },
    /// Payee commits funds; also confirms the item in one step
    FundAsPayee {
        /// Signed transaction payload to broadcast before the transition
        signed_tx: Option<String>,
    },
    /// Payer confirms satisfaction with the delivery
    ConfirmAsPayer,
    /// Payee confirms shipment or completion of the service
    ConfirmAsPayee,
    /// A participant contests the outcome and summons the arbiter
    InitiateDispute {
        /// Stated grievance; a default is recorded when omitted
        reason: Option<String>,
    },
    /// Arbiter rules in favor of the payer (refund)
    RuleForPayer,
    /// Arbiter rules in favor of the payee (release)
    RuleForPayee,
    /// Arbiter rules for a 50/50 split
    RuleForSplit,
    /// Scheduler-driven default resolution after the deadline
    TimelockExpiry,
    /// Append a chat message to the record's log
    SendMessage {
        /// Message body
        text: String,
        /// Display label the message is attributed to
        sender_label: String,
    },
    /// Append an evidence-flagged message during a dispute
    SubmitEvidence {
        /// Evidence body
        text: String,
        /// Display label the message is attributed to
        sender_label: String,
    },
    /// Administrator forces settlement of a wedged record
    EmergencyOverride {
        /// Which side receives the funds
        beneficiary: OverrideBeneficiary,
        /// Required justification, kept in the resolution narrative
        justification: String,
    },
    /// Initiator deletes a record nobody has funded
    DeleteUnfunded,
}

impl EscrowAction {
    /// Short identifier for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FundAsPayer { .. } => "fund_as_payer",
            Self::FundAsPayee { .. } => "fund_as_payee",
            Self::ConfirmAsPayer => "confirm_as_payer",
            Self::ConfirmAsPayee => "confirm_as_payee",
            Self::InitiateDispute { .. } => "initiate_dispute",
            Self::RuleForPayer => "rule_for_payer",
            Self::RuleForPayee => "rule_for_payee",
            Self::RuleForSplit => "rule_for_split",
            Self::TimelockExpiry => "timelock_expiry",
            Self::SendMessage { .. } => "send_message",
            Self::SubmitEvidence { .. } => "submit_evidence",
            Self::EmergencyOverride { .. } => "emergency_override",
            Self::DeleteUnfunded => "delete_unfunded",
        }
    }
}

/// One requested mutation of one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    /// Target record
    pub escrow_id: EscrowId,
    /// Who is asking
    pub principal: Principal,
    /// What they are asking for
    pub action: EscrowAction,
}

impl ActionCommand {
    /// Create a command issued by a named actor
    pub fn from_actor(escrow_id: EscrowId, actor_id: ActorId, action: EscrowAction) -> Self {
        Self {
            escrow_id,
            principal: Principal::Actor(actor_id),
            action,
        }
    }

    /// Create a scheduler-issued command
    pub fn from_system(escrow_id: EscrowId, action: EscrowAction) -> Self {
        Self {
            escrow_id,
            principal: Principal::System,
            action,
        }
    }
}

/// What a successfully applied command did
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The record was mutated and persisted; this is its new state
    Transitioned(EscrowRecord),
    /// The record was removed from the store
    Removed(EscrowId),
}

impl ActionOutcome {
    /// The new record state, if the outcome kept the record
    pub fn record(&self) -> Option<&EscrowRecord> {
        match self {
            Self::Transitioned(record) => Some(record),
            Self::Removed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_actor_id() {
        let id = ActorId::new();
        assert_eq!(Principal::Actor(id.clone()).actor_id(), Some(&id));
        assert_eq!(Principal::System.actor_id(), None);
    }

    #[test]
    fn test_action_kinds_are_distinct() {
        let actions = vec![
            EscrowAction::FundAsPayer { signed_tx: None },
            EscrowAction::FundAsPayee { signed_tx: None },
            EscrowAction::ConfirmAsPayer,
            EscrowAction::ConfirmAsPayee,
            EscrowAction::InitiateDispute { reason: None },
            EscrowAction::RuleForPayer,
            EscrowAction::RuleForPayee,
            EscrowAction::RuleForSplit,
            EscrowAction::TimelockExpiry,
            EscrowAction::SendMessage {
                text: String::new(),
                sender_label: String::new(),
            },
            EscrowAction::SubmitEvidence {
                text: String::new(),
                sender_label: String::new(),
            },
            EscrowAction::EmergencyOverride {
                beneficiary: OverrideBeneficiary::Payer,
                justification: String::new(),
            },
            EscrowAction::DeleteUnfunded,
        ];

        let mut kinds: Vec<&'static str> = actions.iter().map(|a| a.kind()).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), actions.len());
    }

    #[test]
    fn test_command_constructors() {
        let escrow_id = EscrowId::new();
        let actor_id = ActorId::new();

        let cmd =
            ActionCommand::from_actor(escrow_id.clone(), actor_id.clone(), EscrowAction::ConfirmAsPayer);
        assert_eq!(cmd.principal, Principal::Actor(actor_id));

        let cmd = ActionCommand::from_system(escrow_id, EscrowAction::TimelockExpiry);
        assert_eq!(cmd.principal, Principal::System);
    }
}
