//! Role resolution
//!
//! Payer, payee, and arbiter are read off the record itself. Administrators
//! are platform-level and injected at construction; the engine never infers
//! override powers from record fields.

use std::collections::HashSet;

use pactum_types::{ActorId, ActorRole, EscrowRecord};

/// Platform role configuration for one processor instance.
#[derive(Debug, Clone, Default)]
pub struct RoleConfig {
    admins: HashSet<ActorId>,
}

impl RoleConfig {
    /// Configuration with no administrators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with the given administrator set.
    pub fn with_admins(admins: impl IntoIterator<Item = ActorId>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
        }
    }

    /// Check if the actor holds platform administrator powers.
    ///
    /// Checked independently of [`resolve`](Self::resolve) so an administrator
    /// who also happens to be a participant keeps override powers.
    pub fn is_administrator(&self, actor_id: &ActorId) -> bool {
        self.admins.contains(actor_id)
    }

    /// Resolve the actor's role relative to one record.
    ///
    /// Record-level roles win over the platform role: an administrator who is
    /// also the payer resolves as `Payer` here.
    pub fn resolve(&self, record: &EscrowRecord, actor_id: &ActorId) -> ActorRole {
        if record.payer.id == *actor_id {
            ActorRole::Payer
        } else if record.payee.id == *actor_id {
            ActorRole::Payee
        } else if record.arbiter_id == *actor_id {
            ActorRole::Arbiter
        } else if self.is_administrator(actor_id) {
            ActorRole::Administrator
        } else {
            ActorRole::Observer
        }
    }
}
