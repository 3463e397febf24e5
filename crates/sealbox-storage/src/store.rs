//! Three-verb wrapper over the OpenDAL operator
//!
//! The engine depends on `upload`/`download`/`delete` and nothing else; how
//! the store authenticates, replicates, or organizes keys stays behind this
//! boundary.

use opendal::Operator;
use tracing::debug;

/// MIME type for persisted containers
pub const CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct RemoteStore {
    op: Operator,
}

impl RemoteStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    /// Upload a container blob under `path`.
    pub async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), opendal::Error> {
        let len = bytes.len();
        self.op
            .write_with(path, bytes)
            .content_type(CONTENT_TYPE)
            .await?;
        debug!(path, bytes = len, "uploaded container");
        Ok(())
    }

    /// Download the blob at `path`.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, opendal::Error> {
        let buf = self.op.read(path).await?;
        debug!(path, bytes = buf.len(), "downloaded container");
        Ok(buf.to_vec())
    }

    /// Delete the blob at `path`.
    pub async fn delete(&self, path: &str) -> Result<(), opendal::Error> {
        self.op.delete(path).await?;
        debug!(path, "deleted container");
        Ok(())
    }
}
