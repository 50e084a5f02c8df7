//! JSON REST API client
//!
//! Thin wrapper over `reqwest` that joins paths onto the configured base URL,
//! applies auth and default headers, and turns non-2xx answers into
//! [`RestError::Remote`].

use crate::error::{RestError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn default_id_attribute() -> String {
    "id".to_string()
}

fn default_true() -> bool {
    true
}

/// Process-wide client settings, passed explicitly to every object
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL; object paths are appended verbatim
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Request timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout: u64,

    /// Accept invalid TLS certificates
    #[serde(default)]
    pub insecure: bool,

    /// Attribute path holding the object id, e.g. `id` or `data/id`
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,

    /// Keys copied from a fresh read into the payload before every update
    #[serde(default)]
    pub copy_keys: Vec<String>,

    /// The POST response body is the created object
    #[serde(default = "default_true")]
    pub create_returns_object: bool,

    /// The PUT response body is the updated object
    #[serde(default = "default_true")]
    pub write_returns_object: bool,

    #[serde(default)]
    pub debug: bool,
}

impl ClientConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: HashMap::new(),
            username: None,
            password: None,
            timeout: 0,
            insecure: false,
            id_attribute: default_id_attribute(),
            copy_keys: Vec::new(),
            create_returns_object: true,
            write_returns_object: true,
            debug: false,
        }
    }

    pub fn with_copy_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.copy_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = attribute.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }
}

/// HTTP transport shared by every remote object built from it
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ApiClient {
    /// Create a new client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.uri.trim().is_empty() {
            return Err(RestError::validation("client uri must not be empty"));
        }
        if config.id_attribute.trim_matches('/').is_empty() {
            return Err(RestError::validation("id_attribute must not be empty"));
        }

        let mut builder = reqwest::Client::builder().danger_accept_invalid_certs(config.insecure);
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn copy_keys(&self) -> &[String] {
        &self.config.copy_keys
    }

    pub fn id_attribute(&self) -> &str {
        &self.config.id_attribute
    }

    /// Full URL for a path on the server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.uri.trim_end_matches('/'), path)
    }

    /// Send one request and return the body of a 2xx response
    pub async fn send(&self, method: Method, path: &str, body: Option<&str>) -> Result<String> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);
        if self.config.debug {
            tracing::info!(body = body.unwrap_or(""), "{} {}", method, url);
        } else {
            tracing::trace!(body = body.unwrap_or(""), "{} {} request body", method, url);
        }

        let mut request = self.http.request(method.clone(), &url);
        let has_content_type = self
            .config
            .headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !has_content_type {
            request = request.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if self.config.debug {
            tracing::info!(status = status.as_u16(), body = %text, "{} {} answered", method, url);
        } else {
            tracing::debug!(status = status.as_u16(), "{} {} answered", method, url);
            tracing::trace!(body = %text, "{} {} response body", method, url);
        }

        if !status.is_success() {
            return Err(RestError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}
