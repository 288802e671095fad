//! # Pactum Types
//!
//! Shared domain types for the Pactum escrow lifecycle engine.
//!
//! This crate defines the vocabulary every other Pactum crate speaks:
//! identifiers, amounts, the escrow record and its status machine, the
//! closed action set, notifications, and the unified error type. It holds
//! no behavior beyond constructors, validation, and small predicates; all
//! transition logic lives in `pactum-core`.

pub mod action;
pub mod amount;
pub mod error;
pub mod escrow;
pub mod identity;
pub mod notify;

pub use action::{
    ActionCommand, ActionOutcome, ActorRole, EscrowAction, OverrideBeneficiary, Principal,
};
pub use amount::Amount;
pub use error::{EscrowError, Result};
pub use escrow::{
    ArbiterRuling, ChatMessage, CreateEscrowRequest, DefaultOutcome, EscrowRecord, EscrowStatus,
    InitiatorRole, Participant,
};
pub use identity::{ActorId, EscrowId, MessageId};
pub use notify::{Notice, Severity};
