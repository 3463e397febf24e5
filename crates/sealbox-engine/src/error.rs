use thiserror::Error;

use sealbox_container::FormatError;
use sealbox_crypto::CryptoError;

pub type EngineResult<T> = Result<T, EngineError>;

/// User-facing error taxonomy.
///
/// Crypto and format failures are never retried (the same passphrase cannot
/// start succeeding); transport failures may be retried by the caller with
/// backoff. Each file in a batch fails independently.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The passphrase failed the strength gate. Raised before any
    /// cryptographic work; no partial state exists.
    #[error("passphrase rejected: {}", .0.join("; "))]
    Policy(Vec<String>),

    /// Wrong passphrase, corrupted data, or tampering — deliberately
    /// indistinguishable, and no plaintext was released.
    #[error("decryption failed")]
    Authentication,

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("transfer failed: {0}")]
    Transport(#[from] opendal::Error),

    #[error("secure random source unavailable: {0}")]
    Randomness(String),

    #[error("encryption failed: {0}")]
    Crypto(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("record store error: {0}")]
    Record(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CryptoError> for EngineError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::Authentication => EngineError::Authentication,
            CryptoError::Randomness(msg) => EngineError::Randomness(msg),
            CryptoError::Encryption(msg) => EngineError::Crypto(msg),
        }
    }
}
