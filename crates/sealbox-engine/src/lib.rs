//! sealbox-engine: orchestration over the crypto core and container codec
//!
//! Sequences one file's pipeline (gate → read → derive → seal → encode →
//! persist → record, and the inverse for decryption), reports coarse
//! progress, isolates per-file failures in batches, and maps everything to
//! one user-facing error taxonomy. The cryptographic steps themselves live
//! in `sealbox-crypto` and `sealbox-container`.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod record;
pub mod records;
pub mod sink;

pub use config::{expand_tilde, SealboxConfig};
pub use error::{EngineError, EngineResult};
pub use pipeline::{
    decrypt_bytes, decrypt_file, encrypt_file, process_batch, pull_and_decrypt, Operation,
    SEALED_SUFFIX,
};
pub use progress::ProgressFn;
pub use record::{FileRecord, FileStatus, Outcome, ProcessedFile};
pub use records::{JsonlRecordStore, NoopRecordStore, RecordStore};
pub use sink::{LocalSink, RemoteSink, Sink};
