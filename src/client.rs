use anyhow::{anyhow, Result};
use reqwest::Client;
use std::time::Duration;

use crate::history::SavedIdea;
use crate::idea::IdeaResult;
use crate::server::{ErrorBody, GenerateRequest};

/// HTTP client for a running idea-studio server.
pub struct StudioClient {
    http: Client,
    base_url: String,
}

impl StudioClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<IdeaResult> {
        let url = format!("{}/api/generate", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach idea-studio server at {url}: {e}"))?;

        if !resp.status().is_success() {
            return Err(server_error(resp).await);
        }

        resp.json()
            .await
            .map_err(|e| anyhow!("Failed to decode idea: {e}"))
    }

    pub async fn save(&self, idea: &IdeaResult) -> Result<SavedIdea> {
        let url = format!("{}/api/history", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(idea)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to reach idea-studio server at {url}: {e}"))?;

        if !resp.status().is_success() {
            return Err(anyhow!("Saving idea failed: {}", server_error(resp).await));
        }

        resp.json()
            .await
            .map_err(|e| anyhow!("Failed to decode saved idea: {e}"))
    }
}

async fn server_error(resp: reqwest::Response) -> anyhow::Error {
    let status = resp.status();
    match resp.json::<ErrorBody>().await {
        Ok(ErrorBody { error, raw: Some(raw) }) => {
            anyhow!("{error} ({status})\nraw reply:\n{raw}")
        }
        Ok(ErrorBody { error, raw: None }) => anyhow!("{error} ({status})"),
        Err(_) => anyhow!("Server returned {status}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn surfaces_server_error_message_and_raw_reply() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Model returned invalid JSON.","raw":"oops"}"#)
            .create_async()
            .await;

        let client = StudioClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let err = client
            .generate(&GenerateRequest {
                prompt: "a game about moss".into(),
                ..GenerateRequest::default()
            })
            .await
            .unwrap_err()
            .to_string();

        assert!(err.starts_with("Model returned invalid JSON. (500"));
        assert!(err.ends_with("raw reply:\noops"));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let client = StudioClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .generate(&GenerateRequest::default())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Failed to reach idea-studio server"));
    }

    #[tokio::test]
    async fn rejected_save_reports_the_server_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/history")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Invalid request body: missing field `designer`"}"#)
            .create_async()
            .await;

        let client = StudioClient::new(server.url(), Duration::from_secs(5)).unwrap();
        let idea: IdeaResult = serde_json::from_value(serde_json::json!({
            "prompt": "a game about moss",
            "genre": "Any",
            "tone": "Any",
            "designer": {"title": "Moss", "coreFantasy": "Grow.", "coreLoop": "Spread.", "mechanics": []},
            "engineer": {"summary": "Cellular.", "systems": [], "challenges": "Scale."},
            "artist": {"summary": "Green.", "imagery": "Stones.", "references": [], "palette": "green"},
            "createdAt": "2025-03-04T05:06:07Z"
        }))
        .unwrap();

        let err = client.save(&idea).await.unwrap_err().to_string();
        assert_eq!(
            err,
            "Saving idea failed: Invalid request body: missing field `designer` (400 Bad Request)"
        );
    }
}
