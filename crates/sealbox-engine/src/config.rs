//! Configuration (loaded from sealbox.toml)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use sealbox_storage::StorageConfig;

use crate::error::{EngineError, EngineResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SealboxConfig {
    pub storage: StorageConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for locally persisted containers and recovered files
    pub dir: PathBuf,
    /// JSON-lines metadata record file; `None` disables record keeping
    pub records_file: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            records_file: Some(PathBuf::from("~/.local/share/sealbox/records.jsonl")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Concurrent file pipelines (0 = available cores)
    pub workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { workers: 0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl SealboxConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Load from a TOML file, falling back to defaults when it is absent.
    pub fn load_or_default(path: &Path) -> EngineResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }
}

/// Expand `~` in a path to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if s.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{}/{}", home, &s[2..]))
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[storage]
endpoint = "https://s3.example.com"
region = "us-west-2"
bucket = "my-containers"
prefix = "sealed"
enforce_tls = true
timeout_secs = 30

[output]
dir = "/tmp/out"

[batch]
workers = 4

[log]
level = "debug"
format = "json"
"#;
        let cfg: SealboxConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.storage.bucket, "my-containers");
        assert!(cfg.storage.enforce_tls);
        assert_eq!(cfg.storage.timeout_secs, 30);
        assert_eq!(cfg.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.batch.workers, 4);
        assert_eq!(cfg.log.format, "json");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: SealboxConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.storage.region, "us-east-1");
        assert_eq!(cfg.batch.workers, 0);
        assert_eq!(cfg.log.level, "info");
        assert!(cfg.output.records_file.is_some());
    }

    #[test]
    fn test_expand_tilde() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(
            expand_tilde(Path::new("~/x/y.toml")),
            PathBuf::from("/home/tester/x/y.toml")
        );
        assert_eq!(expand_tilde(Path::new("/abs/p")), PathBuf::from("/abs/p"));
    }
}
