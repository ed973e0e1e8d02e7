// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::sync::Arc;

use herald_config::HeraldConfig;
use herald_core::{EventRecord, HeraldError, PublishResult};
use herald_host::{Host, LoggingHandler, install_signal_handler};
use herald_publishers::{
    EVENT_TYPE_A_FACTORY, EVENT_TYPE_B_FACTORY, EVENT_TYPE_C_FACTORY, EventKey, EventTypeABody,
    EventTypeBBody, EventTypeCBody, builtin_factories,
};
use tracing::info;

/// Initializes the global subscriber. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("herald={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn start(config: &HeraldConfig) -> Result<Host, HeraldError> {
    let host = Host::start(config, &builtin_factories())?;
    for failure in host.load_failures() {
        eprintln!("herald: plugin not loaded: {failure}");
    }
    Ok(host)
}

fn print_result(event: &EventRecord, result: &Result<PublishResult, HeraldError>) {
    match result {
        Ok(published) if published.success => println!(
            "==> [{}] {} via {}: {}",
            event.event_id, event.event_type, published.sender_name, published.description
        ),
        Ok(published) => println!(
            "==> [{}] {} failed: {}",
            event.event_id, event.event_type, published.description
        ),
        Err(e) => println!("==> [{}] {} not dispatched: {e}", event.event_id, event.event_type),
    }
}

/// Publishes `events` and prints one line per result.
pub async fn dispatch(config: &HeraldConfig, events: &[EventRecord]) -> Result<(), HeraldError> {
    let host = start(config)?;
    let results = host.dispatch_all(events).await;
    for (event, result) in events.iter().zip(&results) {
        print_result(event, result);
    }
    Ok(())
}

/// Consumes `channel` with the logging handler while publishing `events`,
/// until Ctrl+C or SIGTERM.
pub async fn consume(
    config: &HeraldConfig,
    channel: &str,
    events: &[EventRecord],
) -> Result<(), HeraldError> {
    let host = start(config)?;
    let group_id = config.consumer.group_id.as_str();

    // The channel's message schema follows from the publisher writing to it.
    let factory = host
        .registry()
        .descriptors()
        .iter()
        .find(|d| d.publisher.channel() == channel)
        .map(|d| d.manifest.factory.clone())
        .ok_or_else(|| HeraldError::Config(format!("no publisher writes to channel `{channel}`")))?;

    let cancel = install_signal_handler();
    let consumer_loop = match factory.as_str() {
        EVENT_TYPE_A_FACTORY => tokio::spawn(
            host.consumer_loop::<EventKey, EventTypeABody>(group_id, channel, Arc::new(LoggingHandler))?
                .run(cancel.clone()),
        ),
        EVENT_TYPE_B_FACTORY => tokio::spawn(
            host.consumer_loop::<EventKey, EventTypeBBody>(group_id, channel, Arc::new(LoggingHandler))?
                .run(cancel.clone()),
        ),
        EVENT_TYPE_C_FACTORY => tokio::spawn(
            host.consumer_loop::<EventKey, EventTypeCBody>(group_id, channel, Arc::new(LoggingHandler))?
                .run(cancel.clone()),
        ),
        other => {
            return Err(HeraldError::Config(format!(
                "no message schema known for factory `{other}`"
            )));
        }
    };

    let results = host.dispatch_all(events).await;
    for (event, result) in events.iter().zip(&results) {
        print_result(event, result);
    }
    info!(channel, "consuming, press Ctrl+C to stop");

    let stats = consumer_loop
        .await
        .map_err(|e| HeraldError::Internal(format!("consumer task failed: {e}")))??;
    println!(
        "herald: consumed {} record(s) from {channel}, {} failed, {} committed, {} held",
        stats.processed, stats.failed, stats.committed, stats.held
    );
    Ok(())
}

/// Lists loaded publishers and load failures.
pub fn plugins(config: &HeraldConfig) -> Result<(), HeraldError> {
    let host = start(config)?;
    let registry = host.registry();

    println!("{} publisher(s) loaded", registry.len());
    for descriptor in registry.descriptors() {
        println!(
            "  {:<12} v{:<8} {:<20} {} ({})",
            descriptor.name,
            descriptor.manifest.version,
            descriptor.publisher.channel(),
            descriptor.manifest.description,
            descriptor.source,
        );
    }
    for (name, count) in host.router().duplicates() {
        println!("  warning: {count} publishers named {name}; its events will not dispatch");
    }
    if !host.load_failures().is_empty() {
        println!("{} plugin(s) failed to load", host.load_failures().len());
        for failure in host.load_failures() {
            println!("  {failure}");
        }
    }
    Ok(())
}
