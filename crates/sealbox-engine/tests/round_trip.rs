//! End-to-end pipeline tests against a local sink.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;

use sealbox_container::Envelope;
use sealbox_crypto::{OsEntropy, StepRandom};
use sealbox_engine::{
    decrypt_file, encrypt_file, process_batch, EngineError, FileStatus, LocalSink,
    NoopRecordStore, Operation, Outcome, ProgressFn,
};

fn passphrase() -> SecretString {
    SecretString::from("Tr0ub4dor&3!!")
}

fn capture_progress() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let f: ProgressFn = Box::new(move |pct| sink.lock().unwrap().push(pct));
    (f, seen)
}

#[tokio::test]
async fn test_encrypt_decrypt_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let rng = StepRandom::new(1);
    let (progress, seen) = capture_progress();

    let outcome = encrypt_file(
        &passphrase(),
        "note.txt",
        b"ten bytes.".to_vec(),
        &rng,
        &sink,
        &NoopRecordStore,
        Some(&progress),
    )
    .await
    .unwrap();

    let Outcome::Encrypted {
        locator,
        encrypted_filename,
        file_size,
    } = outcome
    else {
        panic!("expected encrypted outcome");
    };
    assert_eq!(encrypted_filename, "note.txt.sealed");
    assert_eq!(file_size, 10);

    // Progress hit every milestone, monotonically, ending at 100
    let reported = seen.lock().unwrap().clone();
    assert_eq!(reported, vec![25, 50, 75, 100]);

    // The container header carries the original filename in the clear
    let container = std::fs::read(&locator).unwrap();
    let envelope = Envelope::decode(&container).unwrap();
    assert_eq!(envelope.filename, "note.txt");

    let out_dir = tempfile::tempdir().unwrap();
    let out_sink = LocalSink::new(out_dir.path());
    let outcome = decrypt_file(&passphrase(), container, &out_sink, None)
        .await
        .unwrap();

    let Outcome::Decrypted {
        original_filename,
        locator,
        file_size,
    } = outcome
    else {
        panic!("expected decrypted outcome");
    };
    assert_eq!(original_filename, "note.txt");
    assert_eq!(file_size, 10);
    assert_eq!(std::fs::read(&locator).unwrap(), b"ten bytes.");
}

#[tokio::test]
async fn test_wrong_passphrase_fails_closed() {
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());

    let outcome = encrypt_file(
        &passphrase(),
        "note.txt",
        b"secret".to_vec(),
        &StepRandom::new(0),
        &sink,
        &NoopRecordStore,
        None,
    )
    .await
    .unwrap();
    let Outcome::Encrypted { locator, .. } = outcome else {
        panic!()
    };

    let container = std::fs::read(&locator).unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let out_sink = LocalSink::new(out_dir.path());
    let err = decrypt_file(
        &SecretString::from("Wr0ng&Passw0rd!"),
        container,
        &out_sink,
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Authentication));
    assert_eq!(err.to_string(), "decryption failed");
    // Nothing was written
    assert_eq!(std::fs::read_dir(out_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_tampered_ciphertext_detected() {
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());

    let Outcome::Encrypted { locator, .. } = encrypt_file(
        &passphrase(),
        "note.txt",
        b"tamper me".to_vec(),
        &StepRandom::new(0),
        &sink,
        &NoopRecordStore,
        None,
    )
    .await
    .unwrap() else {
        panic!()
    };

    let mut container = std::fs::read(&locator).unwrap();
    // Flip one bit in the last byte — inside the ciphertext/tag region
    let last = container.len() - 1;
    container[last] ^= 0x01;

    let out_dir = tempfile::tempdir().unwrap();
    let err = decrypt_file(&passphrase(), container, &LocalSink::new(out_dir.path()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Authentication));
}

#[tokio::test]
async fn test_salt_nonce_ciphertext_unique_per_encryption() {
    let dir = tempfile::tempdir().unwrap();
    let rng = OsEntropy;

    let mut locators = Vec::new();
    for name in ["a.txt", "b.txt"] {
        let Outcome::Encrypted { locator, .. } = encrypt_file(
            &passphrase(),
            name,
            b"same plaintext".to_vec(),
            &rng,
            &LocalSink::new(dir.path()),
            &NoopRecordStore,
            None,
        )
        .await
        .unwrap() else {
            panic!()
        };
        locators.push(locator);
    }

    let first = Envelope::decode(&std::fs::read(&locators[0]).unwrap()).unwrap();
    let second = Envelope::decode(&std::fs::read(&locators[1]).unwrap()).unwrap();
    assert_ne!(first.salt, second.salt);
    assert_ne!(first.nonce, second.nonce);
    assert_ne!(first.ciphertext, second.ciphertext);
}

#[tokio::test]
async fn test_weak_passphrase_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let (progress, seen) = capture_progress();

    let err = encrypt_file(
        &SecretString::from("weak"),
        "note.txt",
        b"data".to_vec(),
        &StepRandom::new(0),
        &sink,
        &NoopRecordStore,
        Some(&progress),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, EngineError::Policy(_)));
    assert!(seen.lock().unwrap().is_empty(), "no progress on immediate failure");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_garbage_container_is_format_error() {
    let out_dir = tempfile::tempdir().unwrap();
    let err = decrypt_file(
        &passphrase(),
        vec![0xFF; 3],
        &LocalSink::new(out_dir.path()),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Format(_)));
    assert!(err.to_string().contains("invalid or corrupted file"));
}

#[tokio::test]
async fn test_batch_failures_are_independent() {
    let work = tempfile::tempdir().unwrap();
    let good = work.path().join("good.txt");
    let bad = work.path().join("bad.sealed");
    std::fs::write(&good, b"fine").unwrap();
    std::fs::write(&bad, b"fine").unwrap();

    // Encrypt both, then decrypt [good.sealed, garbage]: one completes, one errors
    let sealed_dir = tempfile::tempdir().unwrap();
    let results = process_batch(
        Operation::Encrypt,
        vec![good.clone()],
        &passphrase(),
        &StepRandom::new(0),
        &LocalSink::new(sealed_dir.path()),
        &NoopRecordStore,
        2,
        None,
    )
    .await
    .unwrap();
    assert_eq!(results[0].status, FileStatus::Completed);
    let Some(Outcome::Encrypted { ref locator, .. }) = results[0].outcome else {
        panic!()
    };

    let out_dir = tempfile::tempdir().unwrap();
    let results = process_batch(
        Operation::Decrypt,
        vec![PathBuf::from(locator), bad],
        &passphrase(),
        &StepRandom::new(0),
        &LocalSink::new(out_dir.path()),
        &NoopRecordStore,
        2,
        None,
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, FileStatus::Completed);
    assert_eq!(results[0].progress, 100);
    assert_eq!(results[1].status, FileStatus::Error);
    assert!(results[1]
        .error
        .as_deref()
        .unwrap()
        .contains("invalid or corrupted file"));
}

#[tokio::test]
async fn test_batch_weak_passphrase_rejected_upfront() {
    let out_dir = tempfile::tempdir().unwrap();
    let err = process_batch::<LocalSink>(
        Operation::Encrypt,
        vec![PathBuf::from("whatever.txt")],
        &SecretString::from("aaaaaaaaaaaa"),
        &StepRandom::new(0),
        &LocalSink::new(out_dir.path()),
        &NoopRecordStore,
        1,
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Policy(_)));
}
