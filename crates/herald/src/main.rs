// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Herald binary entry point.
//!
//! Loads configuration, starts the host, and runs one subcommand.

mod commands;

use clap::{Parser, Subcommand};
use herald_core::EventRecord;

/// Routes domain events to pluggable, schema-governed publishers.
#[derive(Parser, Debug)]
#[command(name = "herald", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Publish events through the registered publishers.
    Dispatch {
        /// Event as ID:TYPE:PAYLOAD. Repeatable; defaults to one event per
        /// built-in type.
        #[arg(long = "event", value_name = "ID:TYPE:PAYLOAD", value_parser = parse_event)]
        events: Vec<EventRecord>,
    },
    /// Publish events, then consume one channel until Ctrl+C.
    Consume {
        /// Channel to consume; defaults to `consumer.channel`.
        #[arg(long)]
        channel: Option<String>,
        /// Event as ID:TYPE:PAYLOAD published before consuming. Defaults to
        /// one event per built-in type.
        #[arg(long = "event", value_name = "ID:TYPE:PAYLOAD", value_parser = parse_event)]
        events: Vec<EventRecord>,
    },
    /// List loaded publishers and plugins that failed to load.
    Plugins,
}

/// Parses `ID:TYPE:PAYLOAD`. The payload may itself contain colons.
fn parse_event(raw: &str) -> Result<EventRecord, String> {
    let mut parts = raw.splitn(3, ':');
    let (Some(id), Some(event_type), Some(payload)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected ID:TYPE:PAYLOAD, got `{raw}`"));
    };
    let event_id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid event id `{id}`: {e}"))?;
    let event_type = event_type.trim();
    if event_type.is_empty() {
        return Err("event type must not be empty".to_string());
    }
    Ok(EventRecord::new(event_id, event_type, payload))
}

/// Events dispatched when none are given on the command line.
fn default_events() -> Vec<EventRecord> {
    vec![
        EventRecord::new(1, "EventTypeA", "Message 1"),
        EventRecord::new(2, "EventTypeB", "Message 2"),
        EventRecord::new(3, "EventTypeC", "Message 3"),
    ]
}

fn or_default_events(events: Vec<EventRecord>) -> Vec<EventRecord> {
    if events.is_empty() {
        default_events()
    } else {
        events
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match herald_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            herald_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    commands::init_tracing(&config.agent.log_level);

    let outcome = match cli.command {
        Some(Commands::Dispatch { events }) => {
            commands::dispatch(&config, &or_default_events(events)).await
        }
        Some(Commands::Consume { channel, events }) => {
            let channel = channel.unwrap_or_else(|| config.consumer.channel.clone());
            commands::consume(&config, &channel, &or_default_events(events)).await
        }
        Some(Commands::Plugins) => commands::plugins(&config),
        None => {
            println!("herald: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_event_triple() {
        let event = parse_event("2:EventTypeB:Message 2").unwrap();
        assert_eq!(event, EventRecord::new(2, "EventTypeB", "Message 2"));
    }

    #[test]
    fn payload_keeps_its_colons() {
        let event = parse_event("7:EventTypeC:at 10:30").unwrap();
        assert_eq!(event.payload, "at 10:30");
    }

    #[test]
    fn rejects_malformed_events() {
        assert!(parse_event("EventTypeB").is_err());
        assert!(parse_event("x:EventTypeB:p").is_err());
        assert!(parse_event("1::p").is_err());
    }

    #[test]
    fn dispatch_defaults_to_scenario_events() {
        let cli = Cli::try_parse_from(["herald", "dispatch"]).unwrap();
        let Some(Commands::Dispatch { events }) = cli.command else {
            panic!("expected dispatch");
        };
        let events = or_default_events(events);
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["EventTypeA", "EventTypeB", "EventTypeC"]);
    }

    #[test]
    fn consume_accepts_channel_and_events() {
        let cli = Cli::try_parse_from([
            "herald",
            "consume",
            "--channel",
            "EVENT_TYPE_C_TOPIC",
            "--event",
            "3:EventTypeC:hello",
        ])
        .unwrap();
        let Some(Commands::Consume { channel, events }) = cli.command else {
            panic!("expected consume");
        };
        assert_eq!(channel.as_deref(), Some("EVENT_TYPE_C_TOPIC"));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = herald_config::load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "herald");
        assert_eq!(config.consumer.channel, "EVENT_TYPE_B_TOPIC");
    }
}
