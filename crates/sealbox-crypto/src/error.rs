use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Tag verification failed: wrong passphrase, corrupted ciphertext, or
    /// tampering. The message deliberately does not say which.
    #[error("decryption failed")]
    Authentication,

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The platform CSPRNG is unavailable. Fatal; there is no fallback.
    #[error("secure random source unavailable: {0}")]
    Randomness(String),
}
