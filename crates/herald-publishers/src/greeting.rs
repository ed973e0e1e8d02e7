// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper service required by the EventTypeA publisher.

use std::fmt;

/// Factory table key the greeting is provided under.
pub const GREETING_KEY: &str = "greeting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    source: String,
}

impl Greeting {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hello from [{}]", self.source)
    }
}
