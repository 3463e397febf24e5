//! Coarse milestone progress reporting
//!
//! The cipher call is atomic (whole-buffer), so progress is reported at
//! fixed checkpoints rather than per byte: monotonically increasing within
//! one operation, reaching 100 on success, silent on immediate failure.

/// Progress callback (percentage, 0–100).
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

pub(crate) const MILESTONE_PREPARED: u8 = 25;
pub(crate) const MILESTONE_CIPHERED: u8 = 50;
pub(crate) const MILESTONE_ENCODED: u8 = 75;
pub(crate) const MILESTONE_DONE: u8 = 100;

pub(crate) fn report(progress: Option<&ProgressFn>, pct: u8) {
    if let Some(f) = progress {
        f(pct);
    }
}
