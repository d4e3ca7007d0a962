use super::SettingsBackend;
use crate::config::Organisation;
use crate::error::BackendError;
use crate::payload::UpdatePayload;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The organisation settings REST API.
///
/// `GET {base}/organisations/{id}` loads, `PATCH` with
/// `{"integration_config": <payload>}` saves.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        organisation_id: &str,
        token: Option<String>,
    ) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, organisation_id, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        organisation_id: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let endpoint = organisation_endpoint(base_url, organisation_id)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("orgcfg/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let builder = self
            .client
            .request(method, self.endpoint.clone())
            .headers(headers);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn read_organisation(
        &self,
        resp: reqwest::Response,
    ) -> Result<Organisation, BackendError> {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);
        if status == reqwest::StatusCode::NOT_FOUND {
            let message =
                error_message(&body, &text).unwrap_or_else(|| self.endpoint.to_string());
            return Err(BackendError::NotFound(message));
        }
        if !status.is_success() {
            let message = error_message(&body, &text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("no body").to_string());
            warn!(status = status.as_u16(), %message, "settings API rejected request");
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        // Some deployments wrap resources in `{ "data": ... }`.
        let resource = match body.get("data") {
            Some(inner) if inner.is_object() => inner.clone(),
            _ => body,
        };
        Ok(serde_json::from_value(resource)?)
    }
}

/// The `message`/`error` field of a JSON error body, else the raw text.
fn error_message(body: &Value, text: &str) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| Some(text.trim().to_string()).filter(|t| !t.is_empty()))
}

/// `{base}/organisations/{id}`, tolerating a base with or without a
/// trailing slash. The id is always a single percent-encoded segment.
fn organisation_endpoint(base_url: &str, organisation_id: &str) -> Result<Url, BackendError> {
    if organisation_id.trim().is_empty() {
        return Err(BackendError::InvalidConfig(
            "organisation id is empty".to_string(),
        ));
    }
    if matches!(organisation_id, "." | "..") {
        return Err(BackendError::InvalidConfig(format!(
            "organisation id '{}' is not a valid path segment",
            organisation_id
        )));
    }
    let mut endpoint = Url::parse(base_url)
        .map_err(|e| BackendError::InvalidConfig(format!("base_url '{}': {}", base_url, e)))?;
    endpoint
        .path_segments_mut()
        .map_err(|_| {
            BackendError::InvalidConfig(format!("base_url '{}' cannot have a path", base_url))
        })?
        .pop_if_empty()
        .push("organisations")
        .push(organisation_id);
    Ok(endpoint)
}

#[async_trait]
impl SettingsBackend for HttpBackend {
    fn describe(&self) -> String {
        self.endpoint.to_string()
    }

    async fn fetch(&self) -> Result<Organisation, BackendError> {
        debug!(url = %self.endpoint, "fetching organisation");
        let resp = self.request(reqwest::Method::GET).send().await?;
        self.read_organisation(resp).await
    }

    async fn update(&self, payload: &UpdatePayload) -> Result<Organisation, BackendError> {
        debug!(url = %self.endpoint, fields = payload.fields().len(), "patching organisation");
        let body = json!({ "integration_config": payload });
        let resp = self
            .request(reqwest::Method::PATCH)
            .json(&body)
            .send()
            .await?;
        self.read_organisation(resp).await
    }
}
