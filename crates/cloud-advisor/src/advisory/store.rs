use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::rules::{MalformedRule, Rule, RuleSet, ValidationMode};

const RULE_FILE_EXTENSION: &str = "yaml";

/// Directory-backed source of rule snapshots.
///
/// Every `*.yaml` file directly inside the directory holds a YAML list of rules. Files are read
/// in file-name order and rules keep their in-file order; that sequence is the evaluation order.
#[derive(Debug, Clone)]
pub struct RuleStore {
    dir: PathBuf,
    mode: ValidationMode,
}

impl RuleStore {
    pub fn new(dir: impl Into<PathBuf>, mode: ValidationMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Read and validate every rule file, producing a fresh snapshot.
    pub fn load(&self) -> Result<RuleSet, RuleLoadError> {
        if !self.dir.is_dir() {
            warn!(dir = %self.dir.display(), "rule directory missing; starting with no rules");
            return Ok(RuleSet::default());
        }

        let mut rules = Vec::new();
        for path in self.rule_files()? {
            rules.extend(parse_rule_file(&path)?);
        }

        let rule_set = RuleSet::validated(rules, self.mode).map_err(|source| {
            RuleLoadError::Invalid {
                dir: self.dir.clone(),
                source,
            }
        })?;

        info!(
            dir = %self.dir.display(),
            rules = rule_set.len(),
            mode = ?self.mode,
            "loaded rule snapshot"
        );
        Ok(rule_set)
    }

    fn rule_files(&self) -> Result<Vec<PathBuf>, RuleLoadError> {
        let read_error = |source: io::Error| RuleLoadError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            let is_rule_file = path.is_file()
                && path
                    .extension()
                    .is_some_and(|extension| extension == RULE_FILE_EXTENSION);
            if is_rule_file {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Parse one YAML rule file. An empty file yields no rules.
pub fn parse_rule_file(path: &Path) -> Result<Vec<Rule>, RuleLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&raw, path)
}

/// Parse a YAML document holding a list of rules; `origin` labels errors.
pub fn parse_rules(raw: &str, origin: &Path) -> Result<Vec<Rule>, RuleLoadError> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|source| RuleLoadError::Syntax {
            path: origin.to_path_buf(),
            source,
        })?;

    let items = match document {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Sequence(items) => items,
        _ => {
            return Err(RuleLoadError::NotAList {
                path: origin.to_path_buf(),
            })
        }
    };

    let mut rules = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let rule: Rule =
            serde_yaml::from_value(item).map_err(|source| RuleLoadError::Structure {
                path: origin.to_path_buf(),
                index,
                source,
            })?;
        rule.validate().map_err(|source| RuleLoadError::Rule {
            path: origin.to_path_buf(),
            index,
            source,
        })?;
        rules.push(rule);
    }

    Ok(rules)
}

/// Failure while building a rule snapshot from disk.
#[derive(Debug, thiserror::Error)]
pub enum RuleLoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{} is not valid YAML: {source}", path.display())]
    Syntax {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("{} must contain a YAML list of rules", path.display())]
    NotAList { path: PathBuf },
    #[error("{} rule #{index} is malformed: {source}", path.display())]
    Structure {
        path: PathBuf,
        index: usize,
        source: serde_yaml::Error,
    },
    #[error("{} rule #{index} is malformed: {source}", path.display())]
    Rule {
        path: PathBuf,
        index: usize,
        source: MalformedRule,
    },
    #[error("rule set in {} rejected: {source}", dir.display())]
    Invalid { dir: PathBuf, source: MalformedRule },
}
