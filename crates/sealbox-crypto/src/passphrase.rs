//! Passphrase strength gate
//!
//! A policy layered above the cipher: the KDF itself accepts any passphrase,
//! so callers must run this gate before deriving a key or the scheme offers
//! no practical brute-force resistance.
//!
//! Scoring: length ≥ 12 earns 25 points, each of the four character classes
//! 15, and absence of a 4+ run of identical characters 15 (a violation
//! instead costs 10). The score is clamped to 0..=100, and the passphrase
//! is valid iff no requirement failed.

/// Minimum passphrase length in characters
pub const MIN_LENGTH: usize = 12;

const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Outcome of validating one passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassphraseReport {
    /// True iff every required criterion is met (`errors` is empty)
    pub is_valid: bool,
    /// Strength score, 0–100
    pub score: u8,
    /// Human-readable complaints, one per failed criterion
    pub errors: Vec<String>,
}

/// Evaluate a passphrase against the fixed policy.
pub fn validate_passphrase(passphrase: &str) -> PassphraseReport {
    let mut errors = Vec::new();
    let mut score: i32 = 0;

    if passphrase.chars().count() < MIN_LENGTH {
        errors.push(format!(
            "passphrase must be at least {MIN_LENGTH} characters long"
        ));
    } else {
        score += 25;
    }

    if passphrase.chars().any(|c| c.is_ascii_uppercase()) {
        score += 15;
    } else {
        errors.push("passphrase must contain at least one uppercase letter".into());
    }

    if passphrase.chars().any(|c| c.is_ascii_lowercase()) {
        score += 15;
    } else {
        errors.push("passphrase must contain at least one lowercase letter".into());
    }

    if passphrase.chars().any(|c| c.is_ascii_digit()) {
        score += 15;
    } else {
        errors.push("passphrase must contain at least one digit".into());
    }

    if passphrase.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        score += 15;
    } else {
        errors.push("passphrase must contain at least one special character".into());
    }

    if has_repeat_run(passphrase) {
        errors.push(
            "passphrase cannot contain more than 3 consecutive identical characters".into(),
        );
        score -= 10;
    } else {
        score += 15;
    }

    PassphraseReport {
        is_valid: errors.is_empty(),
        score: score.clamp(0, 100) as u8,
        errors,
    }
}

/// True if the passphrase contains a run of 4 or more identical characters.
fn has_repeat_run(s: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in s.chars() {
        if Some(c) == prev {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            prev = Some(c);
            run = 1;
        }
    }
    false
}

/// Display label for a strength score.
pub fn strength_label(score: u8) -> &'static str {
    match score {
        0..=39 => "weak",
        40..=69 => "fair",
        70..=89 => "good",
        _ => "strong",
    }
}
