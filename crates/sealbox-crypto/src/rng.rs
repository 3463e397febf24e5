//! Secure randomness as an injected capability
//!
//! Salts and nonces come from an explicit [`SecureRandom`] source rather
//! than an ambient global, so pipelines stay testable with deterministic
//! fakes while production code uses the OS CSPRNG.

use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::CryptoError;
use crate::{NONCE_SIZE, SALT_SIZE};

/// Source of cryptographically secure random bytes.
pub trait SecureRandom: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system's CSPRNG.
///
/// If the platform entropy source is unavailable the error surfaces as
/// [`CryptoError::Randomness`]; there is no weaker fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl SecureRandom for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| CryptoError::Randomness(e.to_string()))
    }
}

/// Deterministic counter-backed byte source. Tests only — not
/// cryptographically secure.
#[derive(Debug, Default)]
pub struct StepRandom {
    next: AtomicU64,
}

impl StepRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }
}

impl SecureRandom for StepRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        for b in buf.iter_mut() {
            *b = self.next.fetch_add(1, Ordering::Relaxed) as u8;
        }
        Ok(())
    }
}

/// Generate a fresh KDF salt. Never reuse one across encryptions.
pub fn generate_salt(rng: &dyn SecureRandom) -> Result<[u8; SALT_SIZE], CryptoError> {
    let mut salt = [0u8; SALT_SIZE];
    rng.fill(&mut salt)?;
    Ok(salt)
}

/// Generate a fresh AES-GCM nonce, independent of the salt.
pub fn generate_nonce(rng: &dyn SecureRandom) -> Result<[u8; NONCE_SIZE], CryptoError> {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill(&mut nonce)?;
    Ok(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_entropy_distinct_salts() {
        let rng = OsEntropy;
        let salt1 = generate_salt(&rng).unwrap();
        let salt2 = generate_salt(&rng).unwrap();
        assert_ne!(salt1, salt2, "consecutive salts must differ");
    }

    #[test]
    fn test_os_entropy_nonce_length() {
        let nonce = generate_nonce(&OsEntropy).unwrap();
        assert_eq!(nonce.len(), NONCE_SIZE);
    }

    #[test]
    fn test_step_random_deterministic() {
        let a = StepRandom::new(0);
        let b = StepRandom::new(0);
        assert_eq!(generate_salt(&a).unwrap(), generate_salt(&b).unwrap());
    }

    #[test]
    fn test_step_random_advances() {
        let rng = StepRandom::new(0);
        let salt1 = generate_salt(&rng).unwrap();
        let salt2 = generate_salt(&rng).unwrap();
        assert_ne!(salt1, salt2);
    }
}
