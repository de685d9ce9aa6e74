use clap::ValueEnum;
use cloud_advisor::advisory::{RuleStore, ValidationMode, WorkloadDescriptor};
use cloud_advisor::config::AdvisorConfig;
use cloud_advisor::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

/// Rule store from configuration, with CLI overrides applied on top.
pub(crate) fn rule_store(
    config: &AdvisorConfig,
    rules_dir: Option<PathBuf>,
    strict: bool,
) -> RuleStore {
    let dir = rules_dir.unwrap_or_else(|| config.rules_dir.clone());
    let mode = if strict {
        ValidationMode::Strict
    } else {
        config.validation
    };
    RuleStore::new(dir, mode)
}

/// Fail when the store points at a directory that does not exist.
pub(crate) fn require_rule_dir(store: &RuleStore) -> Result<(), AppError> {
    if store.dir().is_dir() {
        return Ok(());
    }
    Err(AppError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("rule directory {} does not exist", store.dir().display()),
    )))
}

pub(crate) fn read_descriptor(path: &Path) -> Result<WorkloadDescriptor, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
