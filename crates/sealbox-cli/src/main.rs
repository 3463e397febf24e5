//! sealbox: passphrase-based file encryption CLI
//!
//! Commands:
//!   encrypt <files...>  - seal files into .sealed containers (local or remote)
//!   decrypt <files...>  - recover originals from .sealed containers
//!   pull <key>          - download a container from the remote store and decrypt it
//!   rm <key>            - delete a container from the remote store
//!   check               - score a passphrase against the strength policy
//!   records             - list metadata records of past encryptions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::sync::Arc;

use sealbox_crypto::{strength_label, validate_passphrase};
use sealbox_engine::{
    config::LogConfig, expand_tilde, process_batch, pull_and_decrypt, FileStatus,
    JsonlRecordStore, LocalSink, NoopRecordStore, Operation, Outcome, ProgressFn, RecordStore,
    RemoteSink, SealboxConfig, Sink,
};
use sealbox_storage::{build_operator_from_env, RemoteStore};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "sealbox",
    version,
    about = "Passphrase-based authenticated file encryption",
    long_about = "sealbox: seal files into self-describing encrypted containers, \
                  locally or in an S3-compatible object store"
)]
struct Cli {
    /// Path to sealbox.toml configuration file
    #[arg(
        long,
        short = 'c',
        env = "SEALBOX_CONFIG",
        default_value = "~/.config/sealbox/config.toml"
    )]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt files into .sealed containers
    ///
    /// With --remote, containers are uploaded to the configured S3 bucket;
    /// credentials are read from AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY.
    Encrypt {
        /// Files to encrypt
        files: Vec<PathBuf>,
        /// Upload containers to the remote store instead of writing locally
        #[arg(long)]
        remote: bool,
        /// Output directory for local containers (default: from config)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// Concurrent file pipelines (0 = available cores)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Decrypt .sealed containers back into the original files
    Decrypt {
        /// Containers to decrypt
        files: Vec<PathBuf>,
        /// Output directory for recovered files (default: from config)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// Concurrent file pipelines (0 = available cores)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Download a container from the remote store and decrypt it
    Pull {
        /// Remote object key (e.g. containers/3f2a….sealed)
        key: String,
        /// Output directory for the recovered file (default: from config)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Delete a container from the remote store
    Rm {
        /// Remote object key
        key: String,
    },

    /// Score a passphrase against the strength policy
    Check,

    /// List metadata records of past encryptions
    Records,
}

// ── main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = expand_tilde(&cli.config);
    let config = SealboxConfig::load_or_default(&config_path)
        .with_context(|| format!("loading config: {}", config_path.display()))?;
    init_logging(&config.log);

    match cli.command {
        Commands::Encrypt {
            files,
            remote,
            out,
            workers,
        } => cmd_encrypt(&config, files, remote, out, workers).await,
        Commands::Decrypt {
            files,
            out,
            workers,
        } => cmd_decrypt(&config, files, out, workers).await,
        Commands::Pull { key, out } => cmd_pull(&config, &key, out).await,
        Commands::Rm { key } => cmd_rm(&config, &key).await,
        Commands::Check => cmd_check(),
        Commands::Records => cmd_records(&config),
    }
}

fn init_logging(log: &LogConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    if log.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

// ── Passphrase prompting ──────────────────────────────────────────────────────

fn prompt_passphrase(confirm: bool) -> Result<SecretString> {
    let first = SecretString::from(rpassword::prompt_password("Passphrase: ")?);

    let verdict = validate_passphrase(first.expose_secret());
    if !verdict.is_valid {
        for complaint in &verdict.errors {
            eprintln!("  ✗ {complaint}");
        }
        anyhow::bail!("passphrase does not meet the strength policy");
    }

    if confirm {
        let second = SecretString::from(rpassword::prompt_password("Confirm passphrase: ")?);
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passphrases do not match");
        }
    }

    Ok(first)
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_file_bars(multi: &MultiProgress, files: &[PathBuf]) -> Arc<Vec<ProgressBar>> {
    let style = ProgressStyle::with_template("{prefix:>20.bold} [{bar:40.cyan/blue}] {pos}%")
        .unwrap()
        .progress_chars("=>-");

    let bars = files
        .iter()
        .map(|path| {
            let pb = multi.add(ProgressBar::new(100));
            pb.set_style(style.clone());
            pb.set_prefix(
                path.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string()),
            );
            pb
        })
        .collect();
    Arc::new(bars)
}

// ── `sealbox encrypt` / `sealbox decrypt` ─────────────────────────────────────

async fn cmd_encrypt(
    config: &SealboxConfig,
    files: Vec<PathBuf>,
    remote: bool,
    out: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("no files to encrypt");
    }
    let passphrase = prompt_passphrase(true)?;
    let workers = workers.unwrap_or(config.batch.workers);

    let records: Box<dyn RecordStore> = match &config.output.records_file {
        Some(path) => Box::new(JsonlRecordStore::new(expand_tilde(path))),
        None => Box::new(NoopRecordStore),
    };

    if remote {
        let op = build_operator_from_env(&config.storage).context("building storage operator")?;
        let sink = RemoteSink::new(RemoteStore::new(op), config.storage.prefix.clone());
        run_batch(Operation::Encrypt, files, &passphrase, &sink, &*records, workers).await
    } else {
        let dir = out.unwrap_or_else(|| config.output.dir.clone());
        let sink = LocalSink::new(expand_tilde(&dir));
        run_batch(Operation::Encrypt, files, &passphrase, &sink, &*records, workers).await
    }
}

async fn cmd_decrypt(
    config: &SealboxConfig,
    files: Vec<PathBuf>,
    out: Option<PathBuf>,
    workers: Option<usize>,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("no files to decrypt");
    }
    let passphrase = prompt_passphrase(false)?;
    let workers = workers.unwrap_or(config.batch.workers);

    let dir = out.unwrap_or_else(|| config.output.dir.clone());
    let sink = LocalSink::new(expand_tilde(&dir));
    run_batch(
        Operation::Decrypt,
        files,
        &passphrase,
        &sink,
        &NoopRecordStore,
        workers,
    )
    .await
}

async fn run_batch<S: Sink>(
    op: Operation,
    files: Vec<PathBuf>,
    passphrase: &SecretString,
    sink: &S,
    records: &dyn RecordStore,
    workers: usize,
) -> Result<()> {
    let multi = MultiProgress::new();
    let bars = make_file_bars(&multi, &files);

    let bars_for_progress = bars.clone();
    let on_progress: Arc<dyn Fn(usize, u8) + Send + Sync> = Arc::new(move |idx, pct| {
        if let Some(pb) = bars_for_progress.get(idx) {
            pb.set_position(pct as u64);
        }
    });

    let results = process_batch(
        op,
        files,
        passphrase,
        &sealbox_crypto::OsEntropy,
        sink,
        records,
        workers,
        Some(on_progress),
    )
    .await?;

    let mut failed = 0usize;
    for (pf, pb) in results.iter().zip(bars.iter()) {
        match pf.status {
            FileStatus::Completed => {
                pb.finish();
                match &pf.outcome {
                    Some(Outcome::Encrypted { locator, .. }) => {
                        println!("  {} → {}", pf.path.display(), locator);
                    }
                    Some(Outcome::Decrypted {
                        original_filename,
                        locator,
                        ..
                    }) => {
                        println!(
                            "  {} → {} ({})",
                            pf.path.display(),
                            locator,
                            original_filename
                        );
                    }
                    None => {}
                }
            }
            _ => {
                failed += 1;
                pb.abandon();
                eprintln!(
                    "  {}: {}",
                    pf.path.display(),
                    pf.error.as_deref().unwrap_or("failed")
                );
            }
        }
    }

    let completed = results.len() - failed;
    println!("{completed} file(s) processed, {failed} failed");
    if failed > 0 {
        anyhow::bail!("{failed} file(s) failed");
    }
    Ok(())
}

// ── `sealbox pull` / `sealbox rm` ─────────────────────────────────────────────

async fn cmd_pull(config: &SealboxConfig, key: &str, out: Option<PathBuf>) -> Result<()> {
    let passphrase = prompt_passphrase(false)?;
    let op = build_operator_from_env(&config.storage).context("building storage operator")?;
    let store = RemoteStore::new(op);

    let dir = out.unwrap_or_else(|| config.output.dir.clone());
    let sink = LocalSink::new(expand_tilde(&dir));

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}%")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_prefix("pull");
    let pb_clone = pb.clone();
    let progress: ProgressFn = Box::new(move |pct| pb_clone.set_position(pct as u64));

    let outcome = pull_and_decrypt(&store, key, &passphrase, &sink, Some(&progress))
        .await
        .with_context(|| format!("pulling {key}"))?;
    pb.finish();

    if let Outcome::Decrypted {
        original_filename,
        locator,
        file_size,
    } = outcome
    {
        println!("  recovered: {original_filename}");
        println!("  written:   {locator}");
        println!("  bytes:     {file_size}");
    }
    Ok(())
}

async fn cmd_rm(config: &SealboxConfig, key: &str) -> Result<()> {
    let op = build_operator_from_env(&config.storage).context("building storage operator")?;
    let store = RemoteStore::new(op);
    store
        .delete(key)
        .await
        .with_context(|| format!("deleting {key}"))?;
    println!("deleted {key}");
    Ok(())
}

// ── `sealbox check` ───────────────────────────────────────────────────────────

fn cmd_check() -> Result<()> {
    let passphrase = SecretString::from(rpassword::prompt_password("Passphrase: ")?);
    let verdict = validate_passphrase(passphrase.expose_secret());

    println!(
        "score: {}/100 ({})",
        verdict.score,
        strength_label(verdict.score)
    );
    if verdict.is_valid {
        println!("passphrase meets the policy");
        Ok(())
    } else {
        for complaint in &verdict.errors {
            eprintln!("  ✗ {complaint}");
        }
        anyhow::bail!("passphrase does not meet the strength policy");
    }
}

// ── `sealbox records` ─────────────────────────────────────────────────────────

fn cmd_records(config: &SealboxConfig) -> Result<()> {
    let Some(path) = &config.output.records_file else {
        println!("record keeping is disabled (output.records_file is unset)");
        return Ok(());
    };
    let store = JsonlRecordStore::new(expand_tilde(path));
    let records = store.load()?;
    if records.is_empty() {
        println!("no records");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {:>10} bytes  {}  → {}",
            record.created_at, record.file_size, record.original_filename, record.storage_path
        );
    }
    Ok(())
}
