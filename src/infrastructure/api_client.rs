// HTTP client for the dataset API
use crate::domain::dataset::{DatasetId, DatasetRecord};
use crate::infrastructure::client_settings::ClientSettings;
use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, settings })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.settings.api_base(), path);
        let builder = self.http.request(method, url);
        match self.settings.auth_token() {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token)),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .context("Failed to send request to the dataset API")?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.detail)
            .unwrap_or(body);
        if message.is_empty() {
            anyhow::bail!("Request failed with status {}", status);
        }
        anyhow::bail!("Request failed with status {}: {}", status, message)
    }

    /// Upload a CSV file and return the stored summary
    pub async fn upload(&self, path: &Path) -> Result<DatasetRecord> {
        let contents = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.csv")
            .to_string();

        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(file_name)
            .mime_str("text/csv")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .send(self.request(Method::POST, "/api/upload/").multipart(form))
            .await?;
        response.json().await.context("Failed to parse upload response")
    }

    /// Most recent uploads, newest first
    pub async fn history(&self) -> Result<Vec<DatasetRecord>> {
        let response = self.send(self.request(Method::GET, "/api/history/")).await?;
        response.json().await.context("Failed to parse history response")
    }

    pub async fn summary(&self, id: DatasetId) -> Result<DatasetRecord> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/summary/{}/", id)))
            .await?;
        response.json().await.context("Failed to parse summary response")
    }

    /// Download the PDF report
    pub async fn report(&self, id: DatasetId) -> Result<Bytes> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/report/{}/", id)))
            .await?;
        response.bytes().await.context("Failed to download report")
    }
}
