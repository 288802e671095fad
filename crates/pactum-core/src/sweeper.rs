//! Timelock sweeper
//!
//! Periodically scans the store for records whose deadline has elapsed and
//! applies the timelock expiry through the processor like any other command,
//! so expiry obeys the same guards and serialization as participant actions.
//!
//! A record can resolve between the scan and the apply; the processor rejects
//! the stale expiry and the sweeper moves on.

use std::sync::Arc;
use std::time::Duration;

use pactum_types::{ActionCommand, EscrowAction, EscrowError, Result};
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{error, info};

use crate::processor::ActionProcessor;
use crate::timer;
use crate::traits::Clock;

/// Background driver for deadline-triggered default outcomes.
pub struct TimelockSweeper {
    processor: Arc<ActionProcessor>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    shutdown: watch::Receiver<()>,
}

impl TimelockSweeper {
    /// Build a sweeper. Signal the watch channel to stop the run loop.
    pub fn new(
        processor: Arc<ActionProcessor>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
        shutdown: watch::Receiver<()>,
    ) -> Self {
        Self {
            processor,
            clock,
            poll_interval,
            shutdown,
        }
    }

    /// Poll until shutdown is signalled.
    pub async fn run(mut self) {
        let mut poll_timer = interval(self.poll_interval);
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "timelock sweeper started"
        );

        loop {
            tokio::select! {
                _ = poll_timer.tick() => {
                    match self.sweep().await {
                        Ok(0) => {}
                        Ok(applied) => {
                            info!(applied, "timelock sweep applied default outcomes");
                        }
                        Err(err) => {
                            error!(error = %err, "timelock sweep failed");
                        }
                    }
                }
                _ = self.shutdown.changed() => {
                    info!("timelock sweeper stopping");
                    break;
                }
            }
        }
    }

    /// One pass over the store. Returns how many expiries were applied.
    pub async fn sweep(&self) -> Result<usize> {
        let now = self.clock.now();
        let records = self.processor.list_escrows().await?;

        let mut applied = 0;
        for record in records {
            if !timer::evaluate(&record, now).is_expired() {
                continue;
            }

            let command =
                ActionCommand::from_system(record.id.clone(), EscrowAction::TimelockExpiry);
            match self.processor.apply(command).await {
                Ok(_) => applied += 1,
                // Lost the race to a participant action between scan and apply.
                Err(EscrowError::WrongStatus { .. }) => {}
                Err(err) => {
                    error!(escrow_id = %record.id, error = %err, "failed to apply timelock expiry");
                }
            }
        }

        Ok(applied)
    }
}
