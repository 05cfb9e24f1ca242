//! Ledger server binary
//!
//! Hosts the ledger for the lifetime of the process and logs every event it
//! publishes. Transport handlers attach to the same `Ledger` instance.

use anyhow::Context;
use kindness_core::{seed, Config, Ledger};
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<Config> {
    match std::env::var("KINDNESS_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path)),
        Err(_) => Config::from_env().context("reading KINDNESS_* environment"),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config);

    tracing::info!(service = %config.service_name, "Starting Kindness Chain ledger");

    let ledger = Ledger::new(config)?;

    let (_subscription, mut events) = ledger.subscribe_channel();
    let logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            tracing::info!(
                sequence = event.sequence,
                kind = %event.kind,
                payload = %event.payload,
                "Event"
            );
        }
    });

    if ledger.config().seed.enabled {
        let report = seed::load_demo(&ledger)?;
        tracing::info!(
            participants = report.participants,
            transfers = report.transfers,
            total_supply = ledger.total_supply(),
            "Demo data ready"
        );
    }

    let pulse = ledger.pulse();
    tracing::info!(
        participants = pulse.participant_count,
        feed_entries = ledger.recent_feed().len(),
        recent_transfers = pulse.recent_transfers,
        score = pulse.score,
        "Ledger ready"
    );

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down ledger server");
    drop(ledger);
    logger.abort();
    Ok(())
}
