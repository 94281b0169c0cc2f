//! Shared test host for HTTP integration tests.
//!
//! Starts the real router on an ephemeral port and talks to it with
//! reqwest. The remote mode runs the remote memory store over an in-process
//! KV backend that records every command it receives.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusBuilder;
use mneme::http::{self, AppState};
use mneme::kv::{KvBackend, KvStore, MemoryBackend};
use mneme::memory::MemoryService;
use reqwest::{Client, Response};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// KV backend that logs commands as `"SET key"`, `"EXPIRE key 5"` and so on,
/// and misbehaves on request.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    inner: MemoryBackend,
    log: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<Vec<String>>>,
    ignore_deletes: Arc<AtomicBool>,
}

impl RecordingBackend {
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Fails every `command`, or only `"{command} {key}"` when a key is given.
    pub fn fail_on(&self, rule: &str) {
        self.failing.lock().unwrap().push(rule.to_string());
    }

    /// Makes `DEL` report zero removed keys and leave the data in place.
    pub fn ignore_deletes(&self) {
        self.ignore_deletes.store(true, Ordering::SeqCst);
    }

    fn record(&self, entry: String) -> Result<()> {
        self.log.lock().unwrap().push(entry.clone());

        let failing = self.failing.lock().unwrap();
        let command = entry.split(' ').next().unwrap_or_default();
        if failing.iter().any(|rule| rule == command || *rule == entry) {
            bail!("connection refused ({entry})");
        }
        Ok(())
    }
}

#[async_trait]
impl KvBackend for RecordingBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.record(format!("GET {key}"))?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.record(format!("SET {key}"))?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        self.record(format!("DEL {key}"))?;
        if self.ignore_deletes.load(Ordering::SeqCst) {
            return Ok(0);
        }
        self.inner.delete(key).await
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        self.record(format!("KEYS {pattern}"))?;
        self.inner.keys(pattern).await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        self.record(format!("EXPIRE {key} {}", ttl.as_secs()))?;
        self.inner.expire(key, ttl).await
    }

    async fn ping(&self) -> Result<String> {
        self.record("PING".to_string())?;
        self.inner.ping().await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Builder for [`TestApp`].
#[derive(Default)]
pub struct TestAppBuilder {
    remote: bool,
    metrics: bool,
}

impl TestAppBuilder {
    /// Use the remote memory store over a [`RecordingBackend`].
    pub fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Serve `/metrics` from a fresh, uninstalled recorder.
    pub fn with_metrics(mut self) -> Self {
        self.metrics = true;
        self
    }

    pub async fn start(self) -> Result<TestApp> {
        let backend = RecordingBackend::default();
        let (memory, kv) = if self.remote {
            let kv = KvStore::custom(backend.clone());
            (MemoryService::remote(kv.clone()), kv)
        } else {
            (MemoryService::local(), KvStore::custom(backend.clone()))
        };

        let mut state = AppState::new(memory, kv);
        if self.metrics {
            state = state.with_metrics(PrometheusBuilder::new().build_recorder().handle());
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind test listener")?;
        let addr = listener.local_addr()?;
        let router = http::router(state);
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(TestApp {
            base_url: format!("http://{addr}"),
            client: Client::new(),
            backend,
            server,
        })
    }
}

/// A running API instance.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    /// Records KV traffic. In local mode only preferences and diagnostics use it.
    pub backend: RecordingBackend,
    server: JoinHandle<()>,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?)
    }

    pub async fn delete_json(&self, path: &str, body: &Value) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).json(body).send().await?)
    }

    pub async fn get_with_cookie(&self, path: &str, cookie: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .header("cookie", cookie)
            .send()
            .await?)
    }

    pub async fn post_json_with_cookie(
        &self,
        path: &str,
        cookie: &str,
        body: &Value,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .header("cookie", cookie)
            .json(body)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Status and JSON body of a response.
pub async fn response_json(resp: Response) -> (u16, Value) {
    let status = resp.status().as_u16();
    let body = resp.json().await.expect("response body is not JSON");
    (status, body)
}
