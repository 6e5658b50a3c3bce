//! Authenticated HTTP transport shared by the page fetcher and the attachment
//! relocator.
//!
//! Authentication and the extra static headers are installed once as default
//! headers on the underlying `reqwest::Client`, so every request made through
//! a [`Transport`] carries them.

use crate::config::Config;
use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// `Authorization: Bearer <token>` (personal access tokens).
    Bearer(String),
    /// HTTP basic auth with a username and an API token or password.
    Basic {
        /// Account name or e-mail.
        username: String,
        /// API token or password.
        token: String,
    },
}

impl Credentials {
    /// Pick the auth mode: basic when a username is given, bearer otherwise.
    pub fn from_parts(username: Option<String>, token: String) -> Self {
        match username.filter(|u| !u.trim().is_empty()) {
            Some(username) => Self::Basic { username, token },
            None => Self::Bearer(token),
        }
    }

    fn header_value(&self) -> Result<HeaderValue> {
        let raw = match self {
            Self::Bearer(token) => format!("Bearer {token}"),
            Self::Basic { username, token } => {
                format!("Basic {}", STANDARD.encode(format!("{username}:{token}")))
            },
        };
        let mut value = HeaderValue::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid credentials: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// Keep secrets out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}:***)"),
        }
    }
}

/// HTTP client carrying credentials and static headers.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
}

impl Transport {
    /// Build a transport from the run configuration and credentials.
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, credentials.header_value()?);

        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("Invalid value for header '{name}': {e}")))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self { client })
    }

    /// GET a JSON document and decode it.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        let body = Self::check_status(url, response)?.bytes().await?;
        debug!("Decoding {} bytes from {}", body.len(), url);
        Ok(serde_json::from_slice(&body)?)
    }

    /// GET a binary body.
    #[instrument(level = "debug", skip(self))]
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let body = Self::check_status(url, response)?.bytes().await?;
        Ok(body.to_vec())
    }

    fn check_status(url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}
