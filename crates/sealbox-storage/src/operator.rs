//! OpenDAL Operator factory for S3-compatible backends

use anyhow::{Context, Result};
use opendal::layers::{LoggingLayer, TimeoutLayer};
use opendal::Operator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Remote store settings. Any S3-compatible endpoint with path-style
/// addressing works (MinIO, SeaweedFS, AWS).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// S3 endpoint URL
    pub endpoint: String,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// Bucket holding encrypted containers
    pub bucket: String,
    /// Object key prefix for uploaded containers
    pub prefix: String,
    /// Refuse plaintext HTTP endpoints
    pub enforce_tls: bool,
    /// Per-operation timeout in seconds
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9000".into(),
            region: "us-east-1".into(),
            bucket: "sealbox".into(),
            prefix: "containers".into(),
            enforce_tls: false,
            timeout_secs: 60,
        }
    }
}

/// Build an OpenDAL Operator for the configured S3 endpoint.
///
/// Uses path-style addressing (the opendal 0.55 default), which MinIO and
/// SeaweedFS require. If `enforce_tls` is set and the endpoint uses HTTP,
/// this returns an error; otherwise a warning is logged for non-HTTPS
/// endpoints.
///
/// Retry policy deliberately stays with the caller; the operator only
/// carries a transfer timeout.
pub fn build_operator(
    cfg: &StorageConfig,
    access_key_id: &str,
    secret_access_key: &str,
) -> Result<Operator> {
    if cfg.endpoint.starts_with("http://") {
        if cfg.enforce_tls {
            anyhow::bail!(
                "S3 endpoint uses plaintext HTTP ({}), but enforce_tls is enabled. \
                 Use an HTTPS endpoint or set storage.enforce_tls = false for local development.",
                cfg.endpoint
            );
        }
        tracing::warn!(
            endpoint = %cfg.endpoint,
            "S3 endpoint uses plaintext HTTP — credentials are transmitted unencrypted. \
             Set storage.enforce_tls = true and use HTTPS in production."
        );
    }

    let builder = opendal::services::S3::default()
        .endpoint(&cfg.endpoint)
        .region(&cfg.region)
        .bucket(&cfg.bucket)
        .access_key_id(access_key_id)
        .secret_access_key(secret_access_key);

    let op = Operator::new(builder)
        .context("creating OpenDAL S3 operator")?
        .layer(LoggingLayer::default())
        .layer(TimeoutLayer::new().with_timeout(Duration::from_secs(cfg.timeout_secs)))
        .finish();

    Ok(op)
}

/// Build an operator with credentials from the environment.
pub fn build_operator_from_env(cfg: &StorageConfig) -> Result<Operator> {
    let access_key = std::env::var("AWS_ACCESS_KEY_ID")
        .or_else(|_| std::env::var("SEALBOX_ACCESS_KEY_ID"))
        .context(
            "S3 credentials not set\n\
             Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY environment variables.\n\
             Example:\n\
             \texport AWS_ACCESS_KEY_ID=your-key\n\
             \texport AWS_SECRET_ACCESS_KEY=your-secret",
        )?;
    let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY")
        .or_else(|_| std::env::var("SEALBOX_SECRET_ACCESS_KEY"))
        .context("AWS_SECRET_ACCESS_KEY environment variable not set")?;

    build_operator(cfg, &access_key, &secret_key)
}
