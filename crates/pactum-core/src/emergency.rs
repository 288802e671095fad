//! Emergency override
//!
//! Last-resort settlement of a wedged record by a platform administrator.
//! The override bypasses participant consent entirely, so it leaves the
//! loudest trail of any action: a required justification in the resolution
//! narrative, a synthetic settlement reference, and a warn-level log line.

use pactum_types::{ActorId, EscrowError, EscrowRecord, EscrowStatus, OverrideBeneficiary, Result};
use tracing::warn;
use uuid::Uuid;

/// Force-settle the record toward the named beneficiary.
///
/// Both participants are marked funded and confirmed so the terminal record
/// is internally consistent with its completed status.
pub(crate) fn apply_override(
    record: &mut EscrowRecord,
    admin_id: &ActorId,
    beneficiary: OverrideBeneficiary,
    justification: &str,
) -> Result<()> {
    let justification = justification.trim();
    if justification.is_empty() {
        return Err(EscrowError::invalid_input(
            "justification",
            "an emergency override must state a justification",
        ));
    }
    if record.status.is_terminal() {
        return Err(EscrowError::wrong_status(format!(
            "Cannot override an escrow in status '{}'",
            record.status
        )));
    }

    let (status, applied) = match beneficiary {
        OverrideBeneficiary::Payer => (EscrowStatus::CompletedRefunded, "Full refund to Payer."),
        OverrideBeneficiary::Payee => (EscrowStatus::CompletedReleased, "Full release to Payee."),
    };
    let reference = format!("override-{}", Uuid::new_v4());

    record.payer.has_funded = true;
    record.payer.has_confirmed = true;
    record.payee.has_funded = true;
    record.payee.has_confirmed = true;
    record.status = status;
    record.resolution_details = Some(format!(
        "Emergency override: {applied} Justification: {justification} Settlement reference: {reference}."
    ));

    warn!(
        escrow_id = %record.id,
        admin_id = %admin_id,
        beneficiary = ?beneficiary,
        reference = %reference,
        "emergency override applied"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pactum_types::{Amount, CreateEscrowRequest, DefaultOutcome, InitiatorRole};

    fn create_test_record() -> EscrowRecord {
        let request = CreateEscrowRequest {
            title: "Wedged escrow".to_string(),
            description: "Payer unreachable".to_string(),
            amount: Amount::from_human(100.0),
            initiator_id: ActorId::new(),
            initiator_role: InitiatorRole::Payer,
            counterparty_id: ActorId::new(),
            arbiter_id: ActorId::new(),
            default_outcome: DefaultOutcome::PayerRefund,
            duration_hours: 72,
        };
        let mut record = EscrowRecord::from_request(request, Utc::now()).unwrap();
        record.status = EscrowStatus::Active;
        record.payer.has_funded = true;
        record.payee.has_funded = true;
        record
    }

    #[test]
    fn test_override_toward_payee() {
        let mut record = create_test_record();
        let admin = ActorId::new();

        apply_override(&mut record, &admin, OverrideBeneficiary::Payee, "stuck payer").unwrap();

        assert_eq!(record.status, EscrowStatus::CompletedReleased);
        assert!(record.payer.has_confirmed);
        assert!(record.payee.has_confirmed);

        let narrative = record.resolution_details.unwrap();
        assert!(narrative.contains("stuck payer"));
        assert!(narrative.contains("override-"));
    }

    #[test]
    fn test_override_toward_payer() {
        let mut record = create_test_record();
        let admin = ActorId::new();

        apply_override(&mut record, &admin, OverrideBeneficiary::Payer, "payee abandoned").unwrap();
        assert_eq!(record.status, EscrowStatus::CompletedRefunded);
    }

    #[test]
    fn test_override_requires_justification() {
        let mut record = create_test_record();
        let admin = ActorId::new();

        let err =
            apply_override(&mut record, &admin, OverrideBeneficiary::Payer, "   ").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        // The guard rejected before touching the record.
        assert_eq!(record.status, EscrowStatus::Active);
    }

    #[test]
    fn test_override_rejected_when_terminal() {
        let mut record = create_test_record();
        record.status = EscrowStatus::CompletedSplit;
        let admin = ActorId::new();

        let err = apply_override(&mut record, &admin, OverrideBeneficiary::Payer, "cleanup")
            .unwrap_err();
        assert_eq!(err.error_code(), "WRONG_STATUS");
    }
}
