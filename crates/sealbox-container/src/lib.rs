//! sealbox-container: the self-describing encrypted file envelope
//!
//! Binary layout (fixed, interop-critical):
//! ```text
//! [4 bytes : header length, u32 little-endian]
//! [N bytes : UTF-8 JSON header {"filename":...,"ivLength":12,"saltLength":32}]
//! [32 bytes: salt]
//! [12 bytes: nonce]
//! [rest    : ciphertext || 16-byte tag]
//! ```
//!
//! A decoder can recover the original filename and all cryptographic
//! parameters from the blob alone; no external bookkeeping is needed.
//!
//! The header's declared lengths are validated against the fixed cipher
//! parameters before any slicing. A header claiming other lengths could
//! desynchronize the salt/nonce/ciphertext boundaries, so it is rejected
//! rather than trusted. Both operations are pure, single-pass transforms.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Salt length the format mandates
pub const SALT_LEN: usize = 32;

/// Nonce (IV) length the format mandates
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length
pub const TAG_LEN: usize = 16;

const LEN_PREFIX: usize = 4;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid or corrupted file: container too short ({0} bytes)")]
    Truncated(usize),

    #[error("invalid or corrupted file: header length {declared} exceeds remaining {remaining} bytes")]
    HeaderOverrun { declared: usize, remaining: usize },

    #[error("invalid or corrupted file: malformed header")]
    MalformedHeader(#[source] serde_json::Error),

    #[error("invalid or corrupted file: declared salt length {0} (expected {})", SALT_LEN)]
    SaltLength(u32),

    #[error("invalid or corrupted file: declared nonce length {0} (expected {})", NONCE_LEN)]
    NonceLength(u32),

    #[error("header serialization failed: {0}")]
    HeaderSerialize(#[source] serde_json::Error),
}

/// Fixed-shape container header. Key names and order are part of the wire
/// format; unknown extra keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    pub filename: String,
    #[serde(rename = "ivLength")]
    pub iv_length: u32,
    #[serde(rename = "saltLength")]
    pub salt_length: u32,
}

/// One encrypted file, decomposed. `ciphertext` includes the trailing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub filename: String,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Serialize to the container byte layout.
    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let header = Header {
            filename: self.filename.clone(),
            iv_length: NONCE_LEN as u32,
            salt_length: SALT_LEN as u32,
        };
        let header_bytes = serde_json::to_vec(&header).map_err(FormatError::HeaderSerialize)?;

        let mut out = Vec::with_capacity(
            LEN_PREFIX + header_bytes.len() + SALT_LEN + NONCE_LEN + self.ciphertext.len(),
        );
        out.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&header_bytes);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        Ok(out)
    }

    /// Parse a container back into its parts.
    ///
    /// Rejects: buffers under 4 bytes, declared header lengths that overrun
    /// the buffer, non-JSON or wrong-shape headers, declared salt/nonce
    /// lengths other than the fixed constants, and bodies too short to hold
    /// salt + nonce + tag.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < LEN_PREFIX {
            return Err(FormatError::Truncated(bytes.len()));
        }

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(&bytes[..LEN_PREFIX]);
        let declared = u32::from_le_bytes(len_bytes) as usize;

        let rest = &bytes[LEN_PREFIX..];
        if declared > rest.len() {
            return Err(FormatError::HeaderOverrun {
                declared,
                remaining: rest.len(),
            });
        }

        let header: Header =
            serde_json::from_slice(&rest[..declared]).map_err(FormatError::MalformedHeader)?;
        if header.salt_length as usize != SALT_LEN {
            return Err(FormatError::SaltLength(header.salt_length));
        }
        if header.iv_length as usize != NONCE_LEN {
            return Err(FormatError::NonceLength(header.iv_length));
        }

        let body = &rest[declared..];
        if body.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(FormatError::Truncated(bytes.len()));
        }

        let (salt_bytes, body) = body.split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = body.split_at(NONCE_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            filename: header.filename,
            salt,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}
