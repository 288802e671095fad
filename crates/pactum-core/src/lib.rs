//! # Pactum Core
//!
//! The escrow lifecycle engine: guard table, action processor, timelock
//! evaluation, and the background sweeper that applies default outcomes.
//!
//! The engine talks to the outside world only through the traits in
//! [`traits`]: a store, a funding broadcaster, a notification sink, and a
//! clock. Wire those up and every escrow mutation flows through
//! [`ActionProcessor::apply`] as a serialized, guarded command.

mod emergency;
pub mod processor;
pub mod resolver;
pub mod roles;
pub mod sweeper;
pub mod timer;
pub mod traits;

#[cfg(test)]
pub(crate) mod testutil;

pub use processor::ActionProcessor;
pub use roles::RoleConfig;
pub use sweeper::TimelockSweeper;
pub use timer::{TimerSnapshot, TimerUrgency};
pub use traits::{
    BroadcastReceipt, Clock, EscrowStore, FundingBroadcaster, ManualClock, NotificationSink,
    SimulatedBroadcaster, SystemClock, TracingNotifier,
};
