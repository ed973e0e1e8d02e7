// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a Confluent-compatible schema registry.

use std::time::Duration;

use async_trait::async_trait;
use herald_core::{HeraldError, RegisteredSchema, SchemaRegistry};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Media type spoken by the registry REST API.
const REGISTRY_MEDIA_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Schema registry reached over its REST API.
///
/// Uses `POST /subjects/{subject}/versions` to register,
/// `POST /subjects/{subject}` to look up and `GET /schemas/ids/{id}` to
/// fetch by id. Every request is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpSchemaRegistry {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct SchemaBody<'a> {
    schema: &'a str,
}

#[derive(Deserialize)]
struct IdResponse {
    id: i32,
}

#[derive(Deserialize)]
struct SchemaResponse {
    schema: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    subject: String,
    id: i32,
    version: i32,
    schema: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error_code: i32,
    message: String,
}

impl HttpSchemaRegistry {
    /// Creates a client for the registry at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HeraldError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(REGISTRY_MEDIA_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(REGISTRY_MEDIA_TYPE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| HeraldError::SchemaRegistry {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// The registry base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_error(&self, err: reqwest::Error) -> HeraldError {
        if err.is_timeout() {
            return HeraldError::Timeout {
                duration: self.timeout,
            };
        }
        HeraldError::SchemaRegistry {
            message: format!("request to {} failed", self.base_url),
            source: Some(Box::new(err)),
        }
    }

    async fn status_error(status: StatusCode, response: reqwest::Response) -> HeraldError {
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => format!("registry returned {status} ({}): {}", err.error_code, err.message),
            Err(_) => format!("registry returned {status}: {body}"),
        };
        HeraldError::schema_registry(message)
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, HeraldError> {
        response
            .json::<T>()
            .await
            .map_err(|e| HeraldError::SchemaRegistry {
                message: "malformed registry response".to_string(),
                source: Some(Box::new(e)),
            })
    }
}

#[async_trait]
impl SchemaRegistry for HttpSchemaRegistry {
    async fn register(&self, subject: &str, schema: &str) -> Result<i32, HeraldError> {
        let url = format!("{}/subjects/{subject}/versions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SchemaBody { schema })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let IdResponse { id } = Self::decode(response).await?;
        debug!(subject, id, "schema registered");
        Ok(id)
    }

    async fn lookup(
        &self,
        subject: &str,
        schema: &str,
    ) -> Result<Option<RegisteredSchema>, HeraldError> {
        let url = format!("{}/subjects/{subject}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&SchemaBody { schema })
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(subject, "schema not registered");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let found: LookupResponse = Self::decode(response).await?;
        Ok(Some(RegisteredSchema {
            id: found.id,
            subject: found.subject,
            version: found.version,
            schema: found.schema,
        }))
    }

    async fn schema_by_id(&self, id: i32) -> Result<String, HeraldError> {
        let url = format!("{}/schemas/ids/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(status, response).await);
        }

        let SchemaResponse { schema } = Self::decode(response).await?;
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCHEMA: &str = r#"{"type":"string"}"#;

    fn client(server: &MockServer) -> HttpSchemaRegistry {
        HttpSchemaRegistry::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn register_posts_schema_and_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subjects/EVENT_TYPE_B_TOPIC-value/versions"))
            .and(body_json(serde_json::json!({ "schema": SCHEMA })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 12 })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client(&server)
            .register("EVENT_TYPE_B_TOPIC-value", SCHEMA)
            .await
            .unwrap();
        assert_eq!(id, 12);
    }

    #[tokio::test]
    async fn lookup_maps_not_found_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subjects/missing-key"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error_code": 40401,
                "message": "Subject not found."
            })))
            .mount(&server)
            .await;

        let found = client(&server).lookup("missing-key", SCHEMA).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn lookup_returns_registered_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/subjects/t-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "subject": "t-key",
                "id": 3,
                "version": 2,
                "schema": SCHEMA
            })))
            .mount(&server)
            .await;

        let found = client(&server).lookup("t-key", SCHEMA).await.unwrap().unwrap();
        assert_eq!(found.id, 3);
        assert_eq!(found.version, 2);
    }

    #[tokio::test]
    async fn schema_by_id_fetches_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schemas/ids/3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "schema": SCHEMA })),
            )
            .mount(&server)
            .await;

        assert_eq!(client(&server).schema_by_id(3).await.unwrap(), SCHEMA);
    }

    #[tokio::test]
    async fn server_error_carries_registry_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "error_code": 409,
                "message": "Schema being registered is incompatible"
            })))
            .mount(&server)
            .await;

        let err = client(&server).register("t-value", SCHEMA).await.unwrap_err();
        assert!(matches!(err, HeraldError::SchemaRegistry { .. }));
        assert!(err.to_string().contains("incompatible"));
    }

    #[tokio::test]
    async fn slow_registry_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "schema": SCHEMA }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let registry = HttpSchemaRegistry::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = registry.schema_by_id(1).await.unwrap_err();
        assert!(matches!(err, HeraldError::Timeout { .. }));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let registry =
            HttpSchemaRegistry::new("http://registry:8081/", Duration::from_secs(1)).unwrap();
        assert_eq!(registry.base_url(), "http://registry:8081");
    }
}
