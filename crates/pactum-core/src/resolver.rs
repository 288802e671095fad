//! Resolution mapping
//!
//! Single home for the narrative text and terminal status attached when a
//! record resolves, so every path that ends an escrow tells the same story.

use pactum_types::{ArbiterRuling, DefaultOutcome, EscrowStatus};

/// Terminal status and narrative for an arbiter ruling.
pub fn ruling_resolution(ruling: ArbiterRuling) -> (EscrowStatus, String) {
    match ruling {
        ArbiterRuling::Payer => (
            EscrowStatus::CompletedRefunded,
            "Arbiter decision: Ruled in favor of Payer.".to_string(),
        ),
        ArbiterRuling::Payee => (
            EscrowStatus::CompletedReleased,
            "Arbiter decision: Ruled in favor of Payee.".to_string(),
        ),
        ArbiterRuling::Split => (
            EscrowStatus::CompletedSplit,
            "Arbiter decision: Ruled for a 50/50 split.".to_string(),
        ),
    }
}

/// Narrative recorded when the timelock fires and the default outcome applies.
pub fn timeout_narrative(outcome: DefaultOutcome) -> String {
    let applied = match outcome {
        DefaultOutcome::PayerRefund => "Full refund to Payer.",
        DefaultOutcome::Split5050 => "50/50 Split.",
        DefaultOutcome::PayeeFavor => "Full release to Payee.",
    };
    format!("Timelock expired: Default outcome - {applied}")
}

/// Narrative for a mutual-confirmation release, worded in confirmation order.
pub fn mutual_agreement_narrative(payer_confirmed_last: bool) -> String {
    if payer_confirmed_last {
        "Mutual agreement: Payer confirmed satisfaction, Payee confirmed delivery.".to_string()
    } else {
        "Mutual agreement: Payee confirmed delivery, Payer confirmed satisfaction.".to_string()
    }
}
