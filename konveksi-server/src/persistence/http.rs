//! HttpGateway - reqwest client for the remote record store
//!
//! | Call | Request |
//! |------|---------|
//! | save | `POST /api/{table}` |
//! | get | `GET /api/{table}` |
//! | update | `PUT /api/{table}/{id}` |
//! | delete | `DELETE /api/{table}/{id}` |
//! | sync_snapshot | `PUT /api/snapshot` |
//! | get_snapshot | `GET /api/snapshot` |

use super::gateway::PersistenceGateway;
use crate::ops::OpsState;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::gateway::GatewayResponse;
use std::time::Duration;

/// HTTP client for the remote store
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    /// Send a request and decode the envelope
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies all become
    /// an error envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> GatewayResponse<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Remote store request failed");
                return GatewayResponse::error(format!("request failed: {e}"));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // The store may still answer with an envelope explaining the failure
            if let Ok(envelope) = serde_json::from_str::<GatewayResponse<T>>(&body)
                && envelope.error.is_some()
            {
                return envelope;
            }
            return GatewayResponse::error(format!("remote store returned {status}: {body}"));
        }

        match response.json::<GatewayResponse<T>>().await {
            Ok(envelope) => envelope,
            Err(e) => GatewayResponse::error(format!("invalid response body: {e}")),
        }
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn save(&self, table: &str, record: Value) -> GatewayResponse<Value> {
        self.send(self.client.post(self.url(table)).json(&record))
            .await
    }

    async fn get(&self, table: &str) -> GatewayResponse<Vec<Value>> {
        self.send(self.client.get(self.url(table))).await
    }

    async fn update(&self, table: &str, id: &str, record: Value) -> GatewayResponse<Value> {
        self.send(
            self.client
                .put(self.url(&format!("{table}/{id}")))
                .json(&record),
        )
        .await
    }

    async fn delete(&self, table: &str, id: &str) -> GatewayResponse<()> {
        self.send(self.client.delete(self.url(&format!("{table}/{id}"))))
            .await
    }

    async fn sync_snapshot(&self, state: &OpsState) -> GatewayResponse<()> {
        self.send(self.client.put(self.url("snapshot")).json(state))
            .await
    }

    async fn get_snapshot(&self) -> GatewayResponse<OpsState> {
        self.send(self.client.get(self.url("snapshot"))).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
