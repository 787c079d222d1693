//! Persistence: JSON ledger files and the run manifest.
//!
//! Layout of an output directory:
//! - `positions.json`, `signals.json`, `orders.json`: each shaped
//!   `{ strategy: { symbol: [record, ...] } }`, only the enabled ones
//! - `manifest.json`: config/dataset fingerprints, seed, and run summary
//!
//! All persisted artifacts carry a `schema_version`. Unknown versions are
//! rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ticklab_core::domain::{ConfigHash, DatasetHash};
use ticklab_core::ledger::{LedgerJson, LedgerSink, SinkError, StrategyLedger};
use tracing::info;

use crate::config::OutputConfig;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

// ─── Ledger files ───────────────────────────────────────────────────

/// Writes the normalized ledger as pretty-printed JSON files.
#[derive(Debug, Clone)]
pub struct JsonLedgerWriter {
    output: OutputConfig,
    written: Vec<PathBuf>,
}

impl JsonLedgerWriter {
    pub fn new(output: OutputConfig) -> Self {
        Self {
            output,
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.output.dir
    }

    /// Files produced by the last successful `persist`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_all(&mut self, ledger: &StrategyLedger) -> Result<()> {
        let dir = &self.output.dir;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;

        let json = LedgerJson::from_ledger(ledger);
        let selected = [
            (self.output.positions, "positions.json", &json.positions),
            (self.output.signals, "signals.json", &json.signals),
            (self.output.orders, "orders.json", &json.orders),
        ];

        let mut written = Vec::new();
        for (enabled, name, doc) in selected {
            if !enabled {
                continue;
            }
            let path = dir.join(name);
            write_json(&path, doc)?;
            info!(path = %path.display(), "Saved {}", name);
            written.push(path);
        }
        self.written = written;
        Ok(())
    }
}

impl LedgerSink for JsonLedgerWriter {
    fn persist(&mut self, ledger: &StrategyLedger) -> Result<(), SinkError> {
        self.write_all(ledger).map_err(Into::into)
    }
}

fn write_json(path: &Path, doc: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(doc)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Manifest ───────────────────────────────────────────────────────

/// What was run, on which data, with which seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub seed: u64,
    pub tick_count: usize,
    pub strategies: Vec<String>,
    /// Serialized `RunSummary`.
    pub summary: Value,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

pub fn export_manifest(manifest: &RunManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize RunManifest to JSON")
}

pub fn import_manifest(json: &str) -> Result<RunManifest> {
    let manifest: RunManifest =
        serde_json::from_str(json).context("failed to deserialize RunManifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

/// Write `manifest.json` into `dir`.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;
    let path = dir.join("manifest.json");
    fs::write(&path, export_manifest(manifest)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
