//! Key derivation: PBKDF2-HMAC-SHA256 passphrase → 256-bit key

use pbkdf2::pbkdf2_hmac;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{KEY_SIZE, SALT_SIZE};

/// PBKDF2 iteration count.
///
/// Chosen to impose deliberate cost on offline brute-force. Raising it makes
/// attacks slower at the price of slower interactive unlock; existing
/// containers always re-derive with the count in force when they were
/// written, so this value is part of the interop contract.
pub const PBKDF2_ITERATIONS: u32 = 600_000;

/// A 256-bit key derived from a passphrase via PBKDF2-HMAC-SHA256.
///
/// Zeroized on drop to prevent secrets lingering in memory. Never
/// serialized, never logged.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 256-bit key from a passphrase and salt.
///
/// Deterministic: the same (passphrase, salt) always yields the same key,
/// which is what makes decryption possible. The salt must be random per
/// encryption and is stored in the clear alongside the ciphertext.
///
/// This function has no opinion about passphrase strength; callers are
/// expected to run [`crate::validate_passphrase`] first.
pub fn derive_key(passphrase: &SecretString, salt: &[u8; SALT_SIZE]) -> DerivedKey {
    derive_key_with_iterations(passphrase, salt, PBKDF2_ITERATIONS)
}

/// Same as [`derive_key`] with an explicit iteration count.
///
/// Exists so tests can use a cheap count; production paths go through
/// [`derive_key`].
pub fn derive_key_with_iterations(
    passphrase: &SecretString,
    salt: &[u8; SALT_SIZE],
    iterations: u32,
) -> DerivedKey {
    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(
        passphrase.expose_secret().as_bytes(),
        salt,
        iterations,
        &mut key,
    );
    DerivedKey::from_bytes(key)
}
