//! Cloud relay adapter
//!
//! Speaks a generic print-relay contract:
//! - `GET  {base}/printers`  lists the account's printers
//! - `POST {base}/printjobs` submits a job
//!
//! Requests carry `Authorization: Bearer <apiKey>`. Any non-2xx answer is a
//! rejection.

use crate::error::{PrintError, PrintResult};
use crate::job::{PrintJob, PrintJobPayload};
use crate::printer::Printer;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// Printer as listed by a relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotePrinter {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Relays disagree on numeric vs string ids
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(u64),
        Str(String),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Num(n) => n.to_string(),
        Id::Str(s) => s,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    printer_id: Option<&'a str>,
    title: &'a str,
    content_type: &'static str,
    content: String,
}

/// Account on a cloud print relay
#[derive(Debug, Clone)]
pub struct CloudService {
    client: reqwest::Client,
    name: String,
    base_url: String,
    api_key: String,
}

impl CloudService {
    pub fn new(
        client: reqwest::Client,
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn check(response: reqwest::Response) -> PrintResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(PrintError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// List printers visible to this account
    #[instrument(skip(self), fields(service = %self.name))]
    pub async fn printers(&self) -> PrintResult<Vec<RemotePrinter>> {
        let response = self
            .client
            .get(format!("{}/printers", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let printers: Vec<RemotePrinter> = Self::check(response).await?.json().await?;
        info!(count = printers.len(), "Listed relay printers");
        Ok(printers)
    }

    /// Submit a job, optionally to a specific remote printer
    #[instrument(skip(self, job), fields(service = %self.name, title = %job.title))]
    pub async fn submit(&self, printer_id: Option<&str>, job: &PrintJob) -> PrintResult<()> {
        let (content_type, content) = match &job.payload {
            PrintJobPayload::Escpos(data) => (
                "raw_base64",
                base64::engine::general_purpose::STANDARD.encode(data),
            ),
            PrintJobPayload::Text(text) => ("plain_text", text.clone()),
        };

        let body = JobRequest {
            printer_id,
            title: &job.title,
            content_type,
            content,
        };

        let response = self
            .client
            .post(format!("{}/printjobs", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        Self::check(response).await.map(|_| ())
    }
}

/// One printer behind a cloud relay
#[derive(Debug, Clone)]
pub struct CloudPrinter {
    service: CloudService,
    printer_id: Option<String>,
}

impl CloudPrinter {
    pub fn new(service: CloudService, printer_id: Option<String>) -> Self {
        Self {
            service,
            printer_id,
        }
    }
}

impl Printer for CloudPrinter {
    async fn print(&self, job: &PrintJob) -> PrintResult<()> {
        self.service.submit(self.printer_id.as_deref(), job).await?;
        info!(service = %self.service.name(), "Print job accepted by relay");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        match self.service.printers().await {
            Ok(printers) => match &self.printer_id {
                Some(id) => printers.iter().any(|p| &p.id == id),
                None => true,
            },
            Err(e) => {
                warn!(service = %self.service.name(), error = %e, "Relay unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::get, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    async fn spawn_relay(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_submit_escpos_as_base64() {
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/printjobs",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some((headers, body));
                    (StatusCode::CREATED, Json(json!({ "id": 1 })))
                }
            }),
        );
        let base = spawn_relay(app).await;

        let service = CloudService::new(reqwest::Client::new(), "relay", base, "k-123");
        let printer = CloudPrinter::new(service, Some("77".to_string()));
        printer
            .print(&PrintJob::escpos("Order T1", vec![0x1B, 0x40]))
            .await
            .unwrap();

        let (headers, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["authorization"], "Bearer k-123");
        assert_eq!(body["printerId"], "77");
        assert_eq!(body["title"], "Order T1");
        assert_eq!(body["contentType"], "raw_base64");
        assert_eq!(body["content"], "G0A=");
    }

    #[tokio::test]
    async fn test_non_2xx_is_rejection() {
        let app = Router::new().route(
            "/printjobs",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn_relay(app).await;

        let service = CloudService::new(reqwest::Client::new(), "relay", base, "wrong");
        let result = service.submit(None, &PrintJob::text("t", "hello")).await;
        match result {
            Err(PrintError::Rejected { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_printers_accepts_numeric_ids() {
        let app = Router::new().route(
            "/printers",
            get(|| async {
                Json(json!([
                    { "id": 42, "name": "Kitchen", "state": "online" },
                    { "id": "bar-1", "name": "Bar" }
                ]))
            }),
        );
        let base = spawn_relay(app).await;

        let service = CloudService::new(reqwest::Client::new(), "relay", base, "k");
        let printers = service.printers().await.unwrap();
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].id, "42");
        assert_eq!(printers[1].id, "bar-1");
        assert!(printers[1].state.is_none());
    }
}
