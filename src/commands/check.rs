//! `mneme check`
//!
//! Validates the configuration, connects to the selected KV store and prints
//! a census of the keys it holds.

use std::path::Path;

use anyhow::{Context, Result};

use mneme::config::Config;
use mneme::kv::{KvStore, redact_token};
use mneme::memory::{BackendKind, Memory, MemoryType, newest_first};
use mneme::reliability::RetryConfig;
use mneme::startup;

/// Memory keys shown in the sample listing.
const SAMPLE_SIZE: usize = 5;

pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("Environment:    {}", config.environment);
    println!("Memory backend: {}", config.backend_kind());

    let validation = config.validate()?;
    for warning in &validation.warnings {
        println!("  warning: {warning}");
    }

    if config.backend_kind() == BackendKind::Local {
        println!("\nLocal store selected: records live in process memory, nothing to inspect.");
        return Ok(());
    }

    let rest = config.rest_config()?;
    println!("REST URL:       {}", rest.url);
    println!("REST token:     {}", redact_token(&rest.token));

    let kv = startup::connect_kv(&config, RetryConfig::default()).await?;
    println!("Connection:     ok\n");

    let census = Census::collect(&kv).await?;
    census.print();

    if !census.memory_keys.is_empty() {
        println!("\nNewest memories:");
        for key in census.memory_keys.iter().take(SAMPLE_SIZE) {
            print_sample(&kv, key).await?;
        }
    }

    Ok(())
}

/// Key counts by namespace.
#[derive(Debug, Default)]
struct Census {
    total: usize,
    per_type: Vec<(MemoryType, usize)>,
    users: usize,
    other: usize,
    /// Every `memory:*` key, newest first.
    memory_keys: Vec<String>,
}

impl Census {
    async fn collect(kv: &KvStore) -> Result<Self> {
        let keys = kv.keys("*").await.context("Failed to list keys")?;

        let mut census = Self {
            total: keys.len(),
            per_type: MemoryType::ALL.into_iter().map(|t| (t, 0)).collect(),
            ..Self::default()
        };

        for key in keys {
            if key.starts_with("user:") {
                census.users += 1;
            } else if let Some(slot) = census
                .per_type
                .iter_mut()
                .find(|(t, _)| key.starts_with(&format!("{}:", t.prefix())))
            {
                slot.1 += 1;
                census.memory_keys.push(key);
            } else {
                census.other += 1;
            }
        }
        census.memory_keys.sort_by(|a, b| newest_first(a, b));

        Ok(census)
    }

    fn print(&self) {
        println!("Keys:           {}", self.total);
        for (memory_type, count) in &self.per_type {
            println!("  {:<13} {count}", format!("{}:", memory_type.prefix()));
        }
        println!("  {:<13} {}", "user:", self.users);
        println!("  {:<13} {}", "other", self.other);
    }
}

async fn print_sample(kv: &KvStore, key: &str) -> Result<()> {
    let Some(bytes) = kv.get(key).await.with_context(|| format!("Failed to read {key}"))? else {
        return Ok(());
    };

    match serde_json::from_slice::<Memory>(&bytes) {
        Ok(memory) => {
            let when = chrono::DateTime::from_timestamp_millis(memory.timestamp)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| memory.timestamp.to_string());
            let preview: String = memory.content.chars().take(60).collect();
            println!("  {key}");
            println!("    {when}  {preview}");
        },
        Err(_) => println!("  {key}\n    (not a memory record: {} bytes)", bytes.len()),
    }
    Ok(())
}
