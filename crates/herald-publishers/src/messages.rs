// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message schemas shared by the built-in publishers and their consumers.

use std::fmt;

use herald_schema::AvroMessage;
use serde::{Deserialize, Serialize};

use crate::enrich::EventDraft;

/// Message key shared by every event type. Carries a correlation id that is
/// fresh for every publish and unrelated to the event id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventKey {
    #[serde(rename = "eventGuid")]
    pub event_guid: String,
}

impl EventKey {
    /// A key with a new random UUID.
    pub fn generate() -> Self {
        Self {
            event_guid: uuid::Uuid::new_v4().to_string(),
        }
    }
}

impl AvroMessage for EventKey {
    const SCHEMA: &'static str = r#"{"type":"record","name":"EventKey","namespace":"herald.events","fields":[{"name":"eventGuid","type":"string"}]}"#;
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "eventGuid: {}", self.event_guid)
    }
}

/// A message body published on one event type's channel.
pub trait EventBody: AvroMessage + fmt::Debug + fmt::Display {
    /// Channel used when the manifest does not name one.
    const DEFAULT_CHANNEL: &'static str;

    fn from_draft(draft: EventDraft) -> Self;
}

macro_rules! event_body {
    ($(#[$meta:meta])* $name:ident, $channel:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            pub id: i64,
            pub name: String,
            pub favorite_number: i32,
            pub favorite_color: String,
        }

        impl AvroMessage for $name {
            const SCHEMA: &'static str = concat!(
                r#"{"type":"record","name":""#,
                stringify!($name),
                r#"","namespace":"herald.events","fields":["#,
                r#"{"name":"id","type":"long"},"#,
                r#"{"name":"name","type":"string"},"#,
                r#"{"name":"favorite_number","type":"int"},"#,
                r#"{"name":"favorite_color","type":"string"}]}"#
            );
        }

        impl EventBody for $name {
            const DEFAULT_CHANNEL: &'static str = $channel;

            fn from_draft(draft: EventDraft) -> Self {
                Self {
                    id: draft.id,
                    name: draft.name,
                    favorite_number: draft.favorite_number,
                    favorite_color: draft.favorite_color,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "id: {}, name: {}, favorite_number: {}, favorite_color: {}",
                    self.id, self.name, self.favorite_number, self.favorite_color
                )
            }
        }
    };
}

event_body!(
    /// Body of a type A event.
    EventTypeABody,
    "EVENT_TYPE_A_TOPIC"
);
event_body!(
    /// Body of a type B event.
    EventTypeBBody,
    "EVENT_TYPE_B_TOPIC"
);
event_body!(
    /// Body of a type C event.
    EventTypeCBody,
    "EVENT_TYPE_C_TOPIC"
);
