//! Encrypt/decrypt pipelines and batch processing
//!
//! Per-file order is fixed: gate → read → derive → seal → encode → persist
//! → record, and the inverse for decryption. Key derivation and the AEAD
//! are CPU-bound (the KDF takes hundreds of milliseconds), so they run on
//! the blocking pool. Files in a batch share no mutable state and fail
//! independently.

use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, warn};

use sealbox_container::Envelope;
use sealbox_crypto::{self as crypto, SecureRandom};
use sealbox_storage::RemoteStore;

use crate::error::{EngineError, EngineResult};
use crate::progress::{
    report, ProgressFn, MILESTONE_CIPHERED, MILESTONE_DONE, MILESTONE_ENCODED,
    MILESTONE_PREPARED,
};
use crate::record::{unix_now, FileRecord, FileStatus, Outcome, ProcessedFile};
use crate::records::RecordStore;
use crate::sink::Sink;

/// Suffix for encrypted artifact names
pub const SEALED_SUFFIX: &str = ".sealed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Run the strength gate; policy failures abort before any crypto work.
fn gate(passphrase: &SecretString) -> EngineResult<()> {
    let verdict = crypto::validate_passphrase(passphrase.expose_secret());
    if !verdict.is_valid {
        return Err(EngineError::Policy(verdict.errors));
    }
    Ok(())
}

/// Owned copy of the passphrase for handing to the blocking pool.
fn owned_passphrase(passphrase: &SecretString) -> SecretString {
    SecretString::from(passphrase.expose_secret().to_owned())
}

/// Encrypt one file's bytes and persist the container through `sink`.
///
/// On success a metadata record is appended to `records`; a record failure
/// is logged and does not fail the file.
pub async fn encrypt_file<S: Sink>(
    passphrase: &SecretString,
    filename: &str,
    plaintext: Vec<u8>,
    rng: &dyn SecureRandom,
    sink: &S,
    records: &dyn RecordStore,
    progress: Option<&ProgressFn>,
) -> EngineResult<Outcome> {
    gate(passphrase)?;

    let salt = crypto::generate_salt(rng)?;
    let nonce = crypto::generate_nonce(rng)?;
    report(progress, MILESTONE_PREPARED);

    let file_size = plaintext.len() as u64;
    let pw = owned_passphrase(passphrase);
    let ciphertext = tokio::task::spawn_blocking(move || {
        let key = crypto::derive_key(&pw, &salt);
        crypto::seal(&key, &nonce, &plaintext)
    })
    .await
    .map_err(|e| EngineError::Crypto(format!("encryption task failed: {e}")))??;
    report(progress, MILESTONE_CIPHERED);

    let envelope = Envelope {
        filename: filename.to_string(),
        salt,
        nonce,
        ciphertext,
    };
    let bytes = envelope.encode()?;
    report(progress, MILESTONE_ENCODED);

    let encrypted_filename = format!("{filename}{SEALED_SUFFIX}");
    let locator = sink.persist(&encrypted_filename, bytes).await?;
    debug!(file = filename, locator = %locator, "encrypted and persisted");

    let record = FileRecord {
        original_filename: filename.to_string(),
        encrypted_filename: encrypted_filename.clone(),
        file_size,
        storage_path: locator.clone(),
        created_at: unix_now(),
    };
    if let Err(e) = records.append(&record) {
        warn!(file = filename, error = %e, "failed to persist metadata record");
    }

    report(progress, MILESTONE_DONE);
    Ok(Outcome::Encrypted {
        locator,
        encrypted_filename,
        file_size,
    })
}

/// Decode a container and recover `(original_filename, plaintext)`.
///
/// Reports up to the 50% milestone; callers persisting the result continue
/// from there.
pub async fn decrypt_bytes(
    passphrase: &SecretString,
    container: Vec<u8>,
    progress: Option<&ProgressFn>,
) -> EngineResult<(String, Vec<u8>)> {
    let Envelope {
        filename,
        salt,
        nonce,
        ciphertext,
    } = Envelope::decode(&container)?;
    report(progress, MILESTONE_PREPARED);

    let pw = owned_passphrase(passphrase);
    let plaintext = tokio::task::spawn_blocking(move || {
        let key = crypto::derive_key(&pw, &salt);
        crypto::open(&key, &nonce, &ciphertext)
    })
    .await
    .map_err(|e| EngineError::Crypto(format!("decryption task failed: {e}")))??;
    report(progress, MILESTONE_CIPHERED);

    Ok((filename, plaintext))
}

/// Decrypt a container and persist the recovered file through `sink`.
pub async fn decrypt_file<S: Sink>(
    passphrase: &SecretString,
    container: Vec<u8>,
    sink: &S,
    progress: Option<&ProgressFn>,
) -> EngineResult<Outcome> {
    let (filename, plaintext) = decrypt_bytes(passphrase, container, progress).await?;
    report(progress, MILESTONE_ENCODED);

    let file_size = plaintext.len() as u64;
    // The header filename is attacker-writable in principle; never let it
    // escape the output directory.
    let safe_name = safe_filename(&filename);
    let locator = sink.persist(&safe_name, plaintext).await?;
    debug!(file = %safe_name, locator = %locator, "decrypted and persisted");

    report(progress, MILESTONE_DONE);
    Ok(Outcome::Decrypted {
        original_filename: filename,
        locator,
        file_size,
    })
}

/// Download a container from the remote store, then decrypt and persist it.
pub async fn pull_and_decrypt<S: Sink>(
    store: &RemoteStore,
    path: &str,
    passphrase: &SecretString,
    sink: &S,
    progress: Option<&ProgressFn>,
) -> EngineResult<Outcome> {
    let container = store.download(path).await?;
    decrypt_file(passphrase, container, sink, progress).await
}

/// Process a batch of local files, at most `workers` concurrently
/// (0 = available cores).
///
/// The gate runs once before any file is touched; after that each file's
/// pipeline succeeds or fails on its own and the returned records reflect
/// per-file terminal states in input order.
pub async fn process_batch<S: Sink>(
    op: Operation,
    files: Vec<std::path::PathBuf>,
    passphrase: &SecretString,
    rng: &dyn SecureRandom,
    sink: &S,
    records: &dyn RecordStore,
    workers: usize,
    on_progress: Option<Arc<dyn Fn(usize, u8) + Send + Sync>>,
) -> EngineResult<Vec<ProcessedFile>> {
    gate(passphrase)?;

    let limit = if workers == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        workers
    };

    let tasks = files.into_iter().enumerate().map(|(idx, path)| {
        let on_progress = on_progress.clone();
        async move {
            let mut pf = ProcessedFile::new(path.clone());
            pf.status = FileStatus::Processing;

            let progress: Option<ProgressFn> = on_progress.map(|f| {
                Box::new(move |pct| f(idx, pct)) as ProgressFn
            });

            let result = match tokio::fs::read(&path).await {
                Err(e) => Err(EngineError::from(e)),
                Ok(data) => match op {
                    Operation::Encrypt => {
                        let filename = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_else(|| "file".to_string());
                        encrypt_file(
                            passphrase,
                            &filename,
                            data,
                            rng,
                            sink,
                            records,
                            progress.as_ref(),
                        )
                        .await
                    }
                    Operation::Decrypt => {
                        decrypt_file(passphrase, data, sink, progress.as_ref()).await
                    }
                },
            };

            match result {
                Ok(outcome) => {
                    pf.status = FileStatus::Completed;
                    pf.progress = 100;
                    pf.outcome = Some(outcome);
                }
                Err(e) => {
                    pf.status = FileStatus::Error;
                    pf.error = Some(e.to_string());
                    warn!(file = %path.display(), error = %e, "file pipeline failed");
                }
            }
            pf
        }
    });

    Ok(futures::stream::iter(tasks)
        .buffered(limit.max(1))
        .collect()
        .await)
}

fn safe_filename(name: &str) -> String {
    std::path::Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| "recovered.bin".to_string())
}
