//! Ticketing and file-listing backend.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use taskdesk_core::models::{Attachment, IssueSummary};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API call failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait TicketFiler: Send + Sync {
    /// File a defect ticket and return the server's JSON response untouched.
    async fn file_issue(
        &self,
        summary: &IssueSummary,
        attachments: &[Attachment],
    ) -> Result<Value, BackendError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuePayload<'a> {
    app_name: &'a str,
    title: &'a str,
    description: &'a str,
    attachments: &'a [Attachment],
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
}

/// A request alongside the JSON it produced, for the API explorer.
#[derive(Debug, Clone, Serialize)]
pub struct FilesExchange {
    pub request: RequestInfo,
    pub response: Value,
}

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    ticket_url: String,
    files_url: String,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            ticket_url: config.ticket_url(),
            files_url: config.files_url(),
        }
    }

    pub async fn list_files(&self) -> Result<FilesExchange, BackendError> {
        tracing::debug!(url = %self.files_url, "Listing backend files");
        let response = self.client.get(&self.files_url).send().await?;
        let response = check_status(response).await?;
        let body = response.json::<Value>().await?;
        Ok(FilesExchange {
            request: RequestInfo {
                url: self.files_url.clone(),
                method: "GET".to_string(),
            },
            response: body,
        })
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(status, "Backend returned an error: {body}");
    Err(BackendError::Status { status, body })
}

#[async_trait]
impl TicketFiler for BackendClient {
    async fn file_issue(
        &self,
        summary: &IssueSummary,
        attachments: &[Attachment],
    ) -> Result<Value, BackendError> {
        let payload = IssuePayload {
            app_name: &summary.app_name,
            title: &summary.title,
            description: &summary.description,
            attachments,
        };
        tracing::info!(
            title = %summary.title,
            attachments = attachments.len(),
            "Filing issue"
        );

        let response = self
            .client
            .post(&self.ticket_url)
            .json(&payload)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigInputs, DEV_API_BASE_URL, TICKET_ENDPOINT};
    use crate::loopback::{self, Recorder};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn ticket(
        State(recorder): State<Recorder>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        recorder.record("/ticket", &headers, body);
        Json(json!({ "issueId": "BUG-7" }))
    }

    async fn broken_ticket() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "database down")
    }

    async fn files() -> Json<Value> {
        Json(json!({ "files": ["shot.png"] }))
    }

    async fn backend(ticket_path: &str) -> (BackendClient, Recorder, String) {
        let recorder = Recorder::default();
        let router = Router::new()
            .route("/ticket", post(ticket))
            .route("/broken-ticket", post(broken_ticket))
            .route("/api/files", get(files))
            .with_state(recorder.clone());
        let base = loopback::serve(router).await;

        let mut config = AppConfig::resolve(ConfigInputs::default());
        config.ticket_endpoint = format!("{base}{ticket_path}");
        config.api_base_url = format!("{base}/api");
        (BackendClient::new(&config), recorder, base)
    }

    fn summary() -> IssueSummary {
        IssueSummary {
            app_name: "Reports".into(),
            title: "Export crashes".into(),
            description: "Clicking export crashes the page".into(),
        }
    }

    #[tokio::test]
    async fn files_issue_as_json_and_echoes_response() {
        let (client, recorder, _) = backend("/ticket").await;
        let attachments = vec![Attachment {
            name: "shot.png".into(),
            mime_type: "image/png".into(),
            data: "aGk=".into(),
        }];

        let response = client.file_issue(&summary(), &attachments).await.unwrap();

        assert_eq!(response, json!({ "issueId": "BUG-7" }));
        let requests = recorder.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].headers["content-type"], "application/json");
        assert_eq!(
            requests[0].body,
            json!({
                "appName": "Reports",
                "title": "Export crashes",
                "description": "Clicking export crashes the page",
                "attachments": [{ "name": "shot.png", "type": "image/png", "data": "aGk=" }]
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_carries_body_text() {
        let (client, _, _) = backend("/broken-ticket").await;

        let err = client.file_issue(&summary(), &[]).await.unwrap_err();

        assert!(matches!(err, BackendError::Status { status: 500, .. }));
        assert_eq!(
            err.to_string(),
            "API call failed with status 500: database down"
        );
    }

    #[tokio::test]
    async fn lists_files_with_request_info() {
        let (client, _, base) = backend("/ticket").await;

        let exchange = client.list_files().await.unwrap();

        assert_eq!(exchange.request.url, format!("{base}/api/files"));
        assert_eq!(exchange.request.method, "GET");
        assert_eq!(exchange.response, json!({ "files": ["shot.png"] }));
    }

    #[test]
    fn payload_uses_ticket_field_names() {
        let attachments = vec![Attachment {
            name: "shot.png".into(),
            mime_type: "image/png".into(),
            data: "aGk=".into(),
        }];
        let payload = IssuePayload {
            app_name: "Reports",
            title: "Export crashes",
            description: "Steps",
            attachments: &attachments,
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["appName"], "Reports");
        assert_eq!(json["attachments"][0]["type"], "image/png");
        assert_eq!(json["attachments"][0]["data"], "aGk=");
    }

    #[test]
    fn status_error_message() {
        let err = BackendError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "API call failed with status 500: boom");
    }

    #[test]
    fn client_uses_resolved_urls() {
        let client = BackendClient::new(&AppConfig::resolve(ConfigInputs::default()));
        assert_eq!(client.ticket_url, TICKET_ENDPOINT);
        assert_eq!(client.files_url, format!("{DEV_API_BASE_URL}/files"));
    }
}
