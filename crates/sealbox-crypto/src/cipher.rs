//! AES-256-GCM authenticated encryption
//!
//! Output layout: `[ciphertext][16-byte tag]` — the tag is appended by the
//! AEAD and verified before any plaintext is released.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::error::CryptoError;
use crate::kdf::DerivedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

/// Encrypt `plaintext` under `key` and `nonce`.
///
/// Pure transformation; the nonce must be fresh for this key. Returns
/// ciphertext with the authentication tag appended.
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))
}

/// Decrypt `ciphertext||tag`, verifying the tag first.
///
/// Fails with [`CryptoError::Authentication`] on a wrong key, corrupted
/// data, or tampering — without distinguishing the three and without
/// releasing any plaintext bytes.
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::Authentication);
    }
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Authentication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KEY_SIZE;

    fn test_key(byte: u8) -> DerivedKey {
        DerivedKey::from_bytes([byte; KEY_SIZE])
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = test_key(1);
        let nonce = [9u8; NONCE_SIZE];
        let plaintext = b"hello, sealed world!";

        let sealed = seal(&key, &nonce, plaintext).unwrap();
        let opened = open(&key, &nonce, &sealed).unwrap();

        assert_eq!(&opened, plaintext);
    }

    #[test]
    fn test_seal_open_empty() {
        let key = test_key(1);
        let nonce = [0u8; NONCE_SIZE];

        let sealed = seal(&key, &nonce, b"").unwrap();
        assert_eq!(sealed.len(), TAG_SIZE, "empty plaintext still carries a tag");

        let opened = open(&key, &nonce, &sealed).unwrap();
        assert_eq!(opened, b"");
    }

    #[test]
    fn test_open_wrong_key() {
        let nonce = [3u8; NONCE_SIZE];
        let sealed = seal(&test_key(1), &nonce, b"secret data").unwrap();

        let result = open(&test_key(2), &nonce, &sealed);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_open_wrong_nonce() {
        let key = test_key(1);
        let sealed = seal(&key, &[3u8; NONCE_SIZE], b"secret data").unwrap();

        let result = open(&key, &[4u8; NONCE_SIZE], &sealed);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_every_bit() {
        let key = test_key(1);
        let nonce = [5u8; NONCE_SIZE];
        let sealed = seal(&key, &nonce, b"ten bytes.").unwrap();

        // Flipping any single bit anywhere in ciphertext or tag must fail
        for byte_idx in 0..sealed.len() {
            for bit in 0..8 {
                let mut tampered = sealed.clone();
                tampered[byte_idx] ^= 1 << bit;
                assert!(
                    matches!(open(&key, &nonce, &tampered), Err(CryptoError::Authentication)),
                    "flipped bit {bit} of byte {byte_idx} was not detected"
                );
            }
        }
    }

    #[test]
    fn test_open_truncated_input() {
        let key = test_key(1);
        let nonce = [5u8; NONCE_SIZE];
        let result = open(&key, &nonce, &[0u8; TAG_SIZE - 1]);
        assert!(matches!(result, Err(CryptoError::Authentication)));
    }

    #[test]
    fn test_sealed_size() {
        let key = test_key(1);
        let nonce = [5u8; NONCE_SIZE];
        let sealed = seal(&key, &nonce, &vec![0u8; 1000]).unwrap();
        assert_eq!(sealed.len(), 1000 + TAG_SIZE);
    }
}
