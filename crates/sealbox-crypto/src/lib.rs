//! sealbox-crypto: passphrase-based file encryption primitives
//!
//! Scheme: PBKDF2-HMAC-SHA256 (600k iterations) stretches a passphrase plus
//! a fresh 32-byte salt into a 256-bit key; AES-256-GCM seals the plaintext
//! under a fresh 12-byte nonce. Salt and nonce are generated per operation
//! and never reused, so every encryption runs under a unique key.
//!
//! All operations are pure, synchronous, and share no state between calls.
//! Key derivation is CPU-bound (hundreds of milliseconds); run it off any
//! latency-sensitive thread.

pub mod cipher;
pub mod error;
pub mod kdf;
pub mod passphrase;
pub mod rng;

pub use cipher::{open, seal};
pub use error::CryptoError;
pub use kdf::{derive_key, derive_key_with_iterations, DerivedKey, PBKDF2_ITERATIONS};
pub use passphrase::{strength_label, validate_passphrase, PassphraseReport};
pub use rng::{generate_nonce, generate_salt, OsEntropy, SecureRandom, StepRandom};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of a KDF salt in bytes
pub const SALT_SIZE: usize = 32;

/// Size of an AES-GCM nonce in bytes (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;
