//! Timelock evaluation
//!
//! Pure computation over a record and an instant. Nothing here mutates state
//! or talks to a store; the sweeper and any UI read the same snapshot.

use chrono::{DateTime, Utc};
use pactum_types::EscrowRecord;

/// How close a running timer is to its deadline.
///
/// Bands follow remaining time as a fraction of the full duration: under a
/// quarter left is `Critical`, under half is `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerUrgency {
    /// At least half the duration remains
    Normal,
    /// Less than half remains
    Warning,
    /// Less than a quarter remains
    Critical,
}

/// Deadline state of one record at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSnapshot {
    /// The record is terminal; the deadline is meaningless
    NotApplicable,
    /// The deadline is in the future
    Running {
        /// Whole seconds until the deadline
        remaining_secs: i64,
        /// Urgency band for display
        urgency: TimerUrgency,
    },
    /// The deadline has elapsed and the default outcome is due
    Expired {
        /// Whole seconds since the deadline
        overdue_secs: i64,
    },
}

impl TimerSnapshot {
    /// Check if the default outcome is due.
    pub fn is_expired(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

/// Evaluate the record's timelock at the given instant.
///
/// The deadline is fixed at creation: `created_at + duration_hours`. An
/// instant exactly on the deadline counts as expired.
pub fn evaluate(record: &EscrowRecord, now: DateTime<Utc>) -> TimerSnapshot {
    if !record.status.timer_applies() {
        return TimerSnapshot::NotApplicable;
    }

    let total_secs = i64::from(record.duration_hours) * 3600;
    let elapsed_secs = (now - record.created_at).num_seconds();
    let remaining_secs = total_secs - elapsed_secs;

    if remaining_secs <= 0 {
        return TimerSnapshot::Expired {
            overdue_secs: -remaining_secs,
        };
    }

    let urgency = if remaining_secs * 4 < total_secs {
        TimerUrgency::Critical
    } else if remaining_secs * 2 < total_secs {
        TimerUrgency::Warning
    } else {
        TimerUrgency::Normal
    };

    TimerSnapshot::Running {
        remaining_secs,
        urgency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pactum_types::{
        ActorId, Amount, CreateEscrowRequest, DefaultOutcome, EscrowStatus, InitiatorRole,
    };

    fn create_test_record(duration_hours: u32) -> EscrowRecord {
        let request = CreateEscrowRequest {
            title: "Timer fixture".to_string(),
            description: "Deadline evaluation".to_string(),
            amount: Amount::from_human(10.0),
            initiator_id: ActorId::new(),
            initiator_role: InitiatorRole::Payer,
            counterparty_id: ActorId::new(),
            arbiter_id: ActorId::new(),
            default_outcome: DefaultOutcome::PayerRefund,
            duration_hours,
        };
        EscrowRecord::from_request(request, Utc::now()).unwrap()
    }

    #[test]
    fn test_not_applicable_when_terminal() {
        let mut record = create_test_record(1);
        record.status = EscrowStatus::CompletedReleased;
        assert_eq!(
            evaluate(&record, record.created_at),
            TimerSnapshot::NotApplicable
        );

        record.status = EscrowStatus::CancelledUnfunded;
        assert_eq!(
            evaluate(&record, record.created_at + Duration::days(30)),
            TimerSnapshot::NotApplicable
        );
    }

    #[test]
    fn test_running_urgency_bands() {
        let record = create_test_record(4);
        let start = record.created_at;

        // 4h duration: full time left is Normal.
        assert_eq!(
            evaluate(&record, start),
            TimerSnapshot::Running {
                remaining_secs: 4 * 3600,
                urgency: TimerUrgency::Normal,
            }
        );

        // Exactly half left still counts as Normal.
        assert_eq!(
            evaluate(&record, start + Duration::hours(2)),
            TimerSnapshot::Running {
                remaining_secs: 2 * 3600,
                urgency: TimerUrgency::Normal,
            }
        );

        // Just under half left.
        assert_eq!(
            evaluate(&record, start + Duration::hours(2) + Duration::seconds(1)),
            TimerSnapshot::Running {
                remaining_secs: 2 * 3600 - 1,
                urgency: TimerUrgency::Warning,
            }
        );

        // Just under a quarter left.
        assert_eq!(
            evaluate(&record, start + Duration::hours(3) + Duration::seconds(1)),
            TimerSnapshot::Running {
                remaining_secs: 3600 - 1,
                urgency: TimerUrgency::Critical,
            }
        );
    }

    #[test]
    fn test_expired_exactly_at_deadline() {
        let record = create_test_record(1);
        let deadline = record.created_at + Duration::hours(1);

        assert_eq!(
            evaluate(&record, deadline),
            TimerSnapshot::Expired { overdue_secs: 0 }
        );
        assert!(evaluate(&record, deadline + Duration::seconds(90)).is_expired());
        assert_eq!(
            evaluate(&record, deadline + Duration::seconds(90)),
            TimerSnapshot::Expired { overdue_secs: 90 }
        );
    }

    #[test]
    fn test_timer_runs_through_dispute_statuses() {
        let mut record = create_test_record(2);
        record.status = EscrowStatus::ArbiterReview;

        let snapshot = evaluate(&record, record.created_at + Duration::minutes(30));
        assert!(matches!(snapshot, TimerSnapshot::Running { .. }));
    }
}
