// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Herald event routing framework.

use thiserror::Error;

/// Boxed error used as the `source` of wrapped failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Herald traits and core operations.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Configuration errors (invalid TOML, missing required fields, double injection).
    #[error("configuration error: {0}")]
    Config(String),

    /// The plugin discovery root could not be read. Fatal to startup.
    #[error("plugin discovery failed for {path}: {message}")]
    Discovery { path: String, message: String },

    /// A single plugin failed to load. Never fatal to discovery.
    #[error("plugin load failed: {reason}")]
    PluginLoad { reason: String },

    /// No publisher is registered under the requested name.
    #[error("no publisher registered for `{name}`")]
    PublisherNotFound { name: String },

    /// More than one publisher is registered under the requested name.
    #[error("{count} publishers registered for `{name}`, expected exactly one")]
    AmbiguousPublisher { name: String, count: usize },

    /// Encoding or decoding a message against its schema failed.
    #[error("serialization error: {message}")]
    Serialization {
        message: String,
        source: Option<BoxError>,
    },

    /// The schema registry rejected a request or could not be reached.
    #[error("schema registry error: {message}")]
    SchemaRegistry {
        message: String,
        source: Option<BoxError>,
    },

    /// Produce/consume transport errors.
    #[error("broker error: {message}")]
    Broker {
        message: String,
        source: Option<BoxError>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HeraldError {
    /// Shorthand for a [`HeraldError::Serialization`] without a source.
    pub fn serialization(message: impl Into<String>) -> Self {
        HeraldError::Serialization {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`HeraldError::SchemaRegistry`] without a source.
    pub fn schema_registry(message: impl Into<String>) -> Self {
        HeraldError::SchemaRegistry {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a [`HeraldError::Broker`] without a source.
    pub fn broker(message: impl Into<String>) -> Self {
        HeraldError::Broker {
            message: message.into(),
            source: None,
        }
    }

    /// Renders the error and its full `source()` chain on one line.
    pub fn detail(&self) -> String {
        let mut out = self.to_string();
        let mut current = std::error::Error::source(self);
        while let Some(err) = current {
            out.push_str(": ");
            out.push_str(&err.to_string());
            current = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_includes_source_chain() {
        let err = HeraldError::Broker {
            message: "delivery failed".into(),
            source: Some(Box::new(std::io::Error::other("connection reset"))),
        };
        assert_eq!(
            err.detail(),
            "broker error: delivery failed: connection reset"
        );
    }

    #[test]
    fn ambiguous_message_carries_count() {
        let err = HeraldError::AmbiguousPublisher {
            name: "EventTypeA".into(),
            count: 2,
        };
        assert!(err.to_string().contains("2 publishers"));
    }
}
