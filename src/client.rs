//! Boundary collaborators: the remote console API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde_json::{json, Value};

use crate::config::Config;
use crate::draft::CreateTableRequest;
use crate::error::{FetchError, SubmissionError};

/// Remote operations the schema surfaces depend on.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ConsoleApi {
    /// Raw schema description for a project, envelope removed.
    async fn fetch_schema(&self, project: &str) -> Result<Value, FetchError>;

    async fn list_tables(&self, project: &str) -> Result<Vec<String>, FetchError>;

    async fn create_table(
        &self,
        project: &str,
        request: &CreateTableRequest,
    ) -> Result<(), SubmissionError>;

    async fn delete_table(&self, project: &str, table: &str) -> Result<(), SubmissionError>;
}

/// [`ConsoleApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpConsoleApi {
    client: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl HttpConsoleApi {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.api_base().to_string(),
            token: config.token.clone(),
        }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, String> {
        build_url(&self.base, segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, segments: &[&str]) -> Result<Value, FetchError> {
        let url = self.url(segments).map_err(FetchError::Transport)?;
        tracing::debug!(%url, "GET");
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: extract_message(&body).unwrap_or_else(|| "Failed to load schema.".into()),
            });
        }
        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Send a mutating request; `Err` carries the backend's message, if any.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: &Value,
    ) -> Result<(), Option<String>> {
        let url = self.url(segments).map_err(Some)?;
        tracing::debug!(%url, %method, "sending");
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "request failed");
                Some(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), "request rejected");
        Err(extract_message(&text))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ConsoleApi for HttpConsoleApi {
    async fn fetch_schema(&self, project: &str) -> Result<Value, FetchError> {
        let body = self.get_json(&["schema", project, "schema-structure"]).await?;
        Ok(unwrap_envelope(body))
    }

    async fn list_tables(&self, project: &str) -> Result<Vec<String>, FetchError> {
        let body = self.get_json(&["projects", project, "tables"]).await?;
        Ok(parse_table_list(&unwrap_envelope(body)))
    }

    async fn create_table(
        &self,
        project: &str,
        request: &CreateTableRequest,
    ) -> Result<(), SubmissionError> {
        let body = serde_json::to_value(request).map_err(|_| SubmissionError::CreateFailed)?;
        self.send(Method::POST, &["projects", project, "tables"], &body)
            .await
            .map_err(SubmissionError::create)
    }

    async fn delete_table(&self, project: &str, table: &str) -> Result<(), SubmissionError> {
        self.send(
            Method::DELETE,
            &["projects", project, "tables", table],
            &json!({ "tableName": table }),
        )
        .await
        .map_err(SubmissionError::delete)
    }
}

fn build_url(base: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid API URL {base}: {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("API URL cannot take a path: {base}"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `message` from a JSON error body.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Responses wrap their payload as `{ "data": ... }`.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Table names from `[{ "table_name": ... }]`; bare strings are accepted too.
pub fn parse_table_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(map) => map
                        .get("table_name")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
