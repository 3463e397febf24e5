//! Persistence targets for encoded containers and recovered plaintext
//!
//! The encrypt and decrypt pipelines are identical up to the final persist
//! step, so that step is a capability: one pipeline, two destinations.

use std::future::Future;
use std::path::PathBuf;
use uuid::Uuid;

use sealbox_storage::RemoteStore;

use crate::error::EngineResult;

/// Where finished bytes go.
pub trait Sink: Send + Sync {
    /// Persist `bytes` under a name derived from `filename`; returns a
    /// locator (local path or remote object key) for later retrieval.
    fn persist(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = EngineResult<String>> + Send;
}

/// Writes into a local directory via temp file + rename, so a crash never
/// leaves a half-written container under the final name.
#[derive(Debug, Clone)]
pub struct LocalSink {
    dir: PathBuf,
}

impl LocalSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Sink for LocalSink {
    fn persist(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = EngineResult<String>> + Send {
        let dir = self.dir.clone();
        let filename = filename.to_string();
        async move {
            tokio::fs::create_dir_all(&dir).await?;
            let target = dir.join(&filename);
            let tmp = dir.join(format!(".{filename}.tmp"));
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &target).await?;
            Ok(target.display().to_string())
        }
    }
}

/// Uploads to the remote object store under a key prefix.
///
/// The object key is a fresh UUID; the original filename lives only inside
/// the encrypted header, so the store learns nothing from key names.
#[derive(Debug, Clone)]
pub struct RemoteSink {
    store: RemoteStore,
    prefix: String,
}

impl RemoteSink {
    pub fn new(store: RemoteStore, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }
}

impl Sink for RemoteSink {
    fn persist(
        &self,
        _filename: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = EngineResult<String>> + Send {
        let store = self.store.clone();
        let prefix = self.prefix.trim_end_matches('/').to_string();
        async move {
            let key = if prefix.is_empty() {
                format!("{}.sealed", Uuid::new_v4())
            } else {
                format!("{}/{}.sealed", prefix, Uuid::new_v4())
            };
            store.upload(&key, bytes).await?;
            Ok(key)
        }
    }
}
