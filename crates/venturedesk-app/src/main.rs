use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use venturedesk_app::session::{open_store, run_session, snapshot_path};
use venturedesk_core::config::load_config;
use venturedesk_schedule::backend::SimulatedLatency;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting venturedesk scheduling session");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    let store = Arc::new(open_store(&config.calendar)?);

    let mut changes = store.watch();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let change = changes.borrow_and_update().clone();
            tracing::info!(
                revision = change.revision,
                cause = ?change.cause,
                count = change.events.len(),
                "Calendar changed"
            );
        }
    });

    let latency = SimulatedLatency(config.simulation.latency());
    let report = run_session(&config, Arc::clone(&store), latency, Utc::now()).await?;

    for (meeting, until) in &report.upcoming {
        tracing::info!(
            event_id = %meeting.id,
            title = %meeting.title,
            status = ?meeting.status(),
            when = %until,
            "Upcoming meeting"
        );
    }
    tracing::info!(upcoming = report.upcoming_count, "Session finished");

    println!("{}", serde_json::to_string_pretty(&report.widgets)?);

    let path = snapshot_path(&config.calendar);
    store.snapshot(Utc::now()).save_to(&path)?;
    tracing::info!(path = %path.display(), "Calendar saved");

    Ok(())
}
