//! Pactum Watchdog - Timelock Sweep Daemon
//!
//! Polls the escrow store and applies the pre-agreed default outcome to every
//! record whose deadline has elapsed. Expiry goes through the same action
//! processor as participant actions, so a record that resolves between scan
//! and apply is simply skipped.
//!
//! # Quick Start
//!
//! ```bash
//! # Sweep every 60 seconds (default)
//! pactum-watchdog
//!
//! # Faster polling, seeded demo records
//! pactum-watchdog --poll-interval-secs 5 --demo
//!
//! # Grant emergency-override powers
//! PACTUM_ADMIN_IDS=actor_7f9c...,actor_02e1... pactum-watchdog
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pactum_core::{
    ActionProcessor, Clock, EscrowStore, RoleConfig, SimulatedBroadcaster, SystemClock,
    TimelockSweeper, TracingNotifier,
};
use pactum_store::MemoryStore;
use pactum_types::{
    ActionCommand, ActorId, Amount, CreateEscrowRequest, DefaultOutcome, EscrowAction,
    EscrowRecord, InitiatorRole,
};

/// Pactum Watchdog - applies default outcomes to expired escrows
#[derive(Parser, Debug)]
#[command(
    name = "pactum-watchdog",
    about = "Pactum timelock watchdog",
    long_about = "Periodically scans escrow records and fires the timelock default outcome \
                  for every record whose deadline has elapsed.",
    version
)]
struct Args {
    /// Seconds between timelock sweeps
    #[arg(long, default_value = "60", env = "PACTUM_POLL_INTERVAL_SECS")]
    poll_interval_secs: u64,

    /// Actor ID granted emergency-override powers (repeatable)
    #[arg(long = "admin-id", env = "PACTUM_ADMIN_IDS", value_delimiter = ',')]
    admin_ids: Vec<String>,

    /// Seed demo escrows so the sweep has work to report
    #[arg(long, default_value = "false")]
    demo: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let admins = args
        .admin_ids
        .iter()
        .map(|raw| {
            ActorId::parse(raw.trim()).with_context(|| format!("invalid admin id '{raw}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!(
        poll_interval_secs = args.poll_interval_secs,
        admins = admins.len(),
        demo = args.demo,
        "pactum watchdog starting"
    );

    let store = Arc::new(MemoryStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let processor = Arc::new(ActionProcessor::new(
        store.clone(),
        Arc::new(SimulatedBroadcaster::new()),
        Arc::new(TracingNotifier),
        clock.clone(),
        RoleConfig::with_admins(admins),
    ));

    if args.demo {
        seed_demo_records(&processor, store.as_ref(), clock.as_ref())
            .await
            .context("failed to seed demo records")?;
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let sweeper = TimelockSweeper::new(
        processor.clone(),
        clock,
        Duration::from_secs(args.poll_interval_secs),
        shutdown_rx,
    );
    let sweep_handle = tokio::spawn(sweeper.run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutdown requested");

    shutdown_tx.send(()).ok();
    sweep_handle.await.context("sweeper task panicked")?;

    tracing::info!("pactum watchdog stopped");
    Ok(())
}

/// Populate the store with records in assorted lifecycle positions.
///
/// One record is backdated past its deadline so the very first sweep has a
/// default outcome to apply; the rest exercise funding and dispute paths.
async fn seed_demo_records(
    processor: &ActionProcessor,
    store: &MemoryStore,
    clock: &dyn Clock,
) -> anyhow::Result<()> {
    // Already overdue: saved directly with a backdated creation instant.
    let overdue = EscrowRecord::from_request(
        demo_request(
            "Concert tickets",
            "Two tickets, will-call pickup",
            1,
            DefaultOutcome::PayerRefund,
        ),
        clock.now() - chrono::Duration::hours(2),
    )?;
    store.save(&overdue).await?;

    // Funded and disputed, arbiter yet to rule.
    let disputed = processor
        .create_escrow(demo_request(
            "Freelance logo design",
            "Three concepts, two revision rounds",
            1,
            DefaultOutcome::Split5050,
        ))
        .await?;
    processor
        .apply(ActionCommand::from_actor(
            disputed.id.clone(),
            disputed.payer.id.clone(),
            EscrowAction::FundAsPayer {
                signed_tx: Some("demo-signed-payer".to_string()),
            },
        ))
        .await?;
    processor
        .apply(ActionCommand::from_actor(
            disputed.id.clone(),
            disputed.payee.id.clone(),
            EscrowAction::FundAsPayee {
                signed_tx: Some("demo-signed-payee".to_string()),
            },
        ))
        .await?;
    processor
        .apply(ActionCommand::from_actor(
            disputed.id.clone(),
            disputed.payer.id.clone(),
            EscrowAction::InitiateDispute {
                reason: Some("Logo does not match the brief".to_string()),
            },
        ))
        .await?;

    // Half-funded, plenty of time left.
    let pending = processor
        .create_escrow(demo_request(
            "Vintage camera",
            "Film camera, shutter serviced",
            72,
            DefaultOutcome::PayeeFavor,
        ))
        .await?;
    processor
        .apply(ActionCommand::from_actor(
            pending.id.clone(),
            pending.payer.id.clone(),
            EscrowAction::FundAsPayer { signed_tx: None },
        ))
        .await?;

    tracing::info!(records = 3, "demo records seeded");
    Ok(())
}

fn demo_request(
    title: &str,
    description: &str,
    duration_hours: u32,
    default_outcome: DefaultOutcome,
) -> CreateEscrowRequest {
    CreateEscrowRequest {
        title: title.to_string(),
        description: description.to_string(),
        amount: Amount::from_human(10.0),
        initiator_id: ActorId::new(),
        initiator_role: InitiatorRole::Payer,
        counterparty_id: ActorId::new(),
        arbiter_id: ActorId::new(),
        default_outcome,
        duration_hours,
    }
}
