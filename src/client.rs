// src/client.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;

use crate::{
    error::AppError,
    models::{
        item::{ApiErrorBody, ContentItem, extract_items},
        kind::ItemKind,
    },
};

/// Where a widget gets its items from.
///
/// Errors are `AppError::Upstream` for transport/HTTP failures and
/// `AppError::UnexpectedShape` for payloads without the expected list.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, kind: ItemKind) -> Result<Vec<ContentItem>, AppError>;
}

/// The content REST API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpContentSource {
    /// Builds a client. No timeout is applied unless one is given.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self, kind: ItemKind) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), kind.path())
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, kind: ItemKind) -> Result<Vec<ContentItem>, AppError> {
        let response = self
            .http
            .get(self.endpoint(kind))
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // A body that is not JSON falls back to the status line.
            let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
            let message = body
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            return Err(AppError::Upstream(message));
        }

        let payload: Value = response.json().await?;
        tracing::debug!("{} API Response: {}", kind.default_title(), payload);

        extract_items(kind, &payload)
    }
}
