//! REST-backed KV storage backend.
//!
//! Talks to hosted Redis-compatible stores that expose the REST command
//! protocol: every command is a `POST` to the endpoint with a JSON array body
//! (`["SET", "key", "value"]`) and a bearer token, answered with
//! `{"result": ...}` on success or `{"error": "..."}` on failure.

use super::backend::KvBackend;
use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Connection settings for [`RestBackend`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Endpoint URL, e.g. `https://eu1-example.upstash.io`.
    pub url: String,
    /// Bearer token sent with every command.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Reply envelope of the REST protocol.
#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// REST key-value backend.
///
/// Stateless apart from the pooled HTTP client; `Clone` is cheap.
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &redact_token(&self.token))
            .finish()
    }
}

impl RestBackend {
    /// Creates a backend from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or token is empty, the URL cannot be
    /// parsed, or the HTTP client cannot be built.
    pub fn new(config: &RestConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            bail!("KV REST URL is not set");
        }
        if config.token.trim().is_empty() {
            bail!("KV REST token is not set");
        }

        let endpoint = Url::parse(config.url.trim())
            .with_context(|| format!("Invalid KV REST URL: {}", config.url))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build KV REST client")?;

        info!(
            endpoint = %endpoint,
            token = %redact_token(&config.token),
            "Configured REST key-value backend"
        );

        Ok(Self {
            client,
            endpoint,
            token: config.token.trim().to_string(),
        })
    }

    /// Sends one command and returns its `result` value.
    async fn command(&self, args: &[&str]) -> Result<Value> {
        let name = args.first().copied().unwrap_or_default();
        debug!(command = name, "KV REST command");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await
            .with_context(|| format!("KV command {name} could not reach {}", self.endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read KV reply for {name}"))?;

        decode_reply(name, status, &body)
    }
}

/// Decodes a REST reply body into its `result` value.
fn decode_reply(command: &str, status: StatusCode, body: &str) -> Result<Value> {
    let reply: RestReply = match serde_json::from_str(body) {
        Ok(reply) => reply,
        Err(e) if status.is_success() => {
            return Err(anyhow!(e).context(format!("Malformed KV reply for {command}")));
        },
        Err(_) => bail!("KV command {command} failed with status {status}"),
    };

    if let Some(error) = reply.error {
        bail!("KV command {command} failed with status {status}: {error}");
    }
    if !status.is_success() {
        bail!("KV command {command} failed with status {status}");
    }

    Ok(reply.result.unwrap_or(Value::Null))
}

/// Converts a `GET` result into raw bytes.
fn value_to_bytes(value: Value) -> Result<Option<Vec<u8>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.into_bytes())),
        other => serde_json::to_vec(&other)
            .map(Some)
            .context("Failed to re-encode KV value"),
    }
}

fn value_to_u64(command: &str, value: &Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("KV command {command} returned a non-integer result: {value}"))
}

fn value_to_keys(value: Value) -> Result<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(anyhow!("KV KEYS returned a non-string key: {other}")),
            })
            .collect(),
        other => bail!("KV KEYS returned a non-array result: {other}"),
    }
}

/// Shortens a secret for display, keeping only its first characters.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}...")
}

#[async_trait]
impl KvBackend for RestBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let value = self.command(&["GET", key]).await?;
        value_to_bytes(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let value = String::from_utf8(value)
            .with_context(|| format!("Value for key '{key}' is not valid UTF-8"))?;
        self.command(&["SET", key, &value]).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let value = self.command(&["DEL", key]).await?;
        value_to_u64("DEL", &value)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let value = self.command(&["KEYS", pattern]).await?;
        value_to_keys(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let seconds = ttl.as_secs().to_string();
        let value = self.command(&["EXPIRE", key, &seconds]).await?;
        Ok(value_to_u64("EXPIRE", &value)? == 1)
    }

    async fn ping(&self) -> Result<String> {
        let value = self.command(&["PING"]).await?;
        Ok(value.as_str().map_or_else(|| value.to_string(), str::to_string))
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}
