use std::fmt::{Display, Formatter};

use tracing::info;

/// Consecutive failures before the warning banner appears.
pub const WARN_THRESHOLD: u32 = 3;
/// Consecutive failures before submission is refused.
pub const BLOCK_THRESHOLD: u32 = 5;

/// User-facing notice raised by the submission circuit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmissionNotice {
    Warning { error_count: u32 },
    Blocked { error_count: u32 },
}

impl SubmissionNotice {
    pub fn message(&self) -> String {
        match self {
            SubmissionNotice::Warning { error_count } => format!(
                "Submission has failed {error_count} times in a row. Check your connection before trying again."
            ),
            SubmissionNotice::Blocked { error_count } => format!(
                "Submission is paused after {error_count} failed attempts. Dismiss this message to try again."
            ),
        }
    }
}

impl Display for SubmissionNotice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Failure counter that warns, then blocks, after consecutive submit failures.
///
/// A dismissal only lasts until the next failure.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SubmissionCircuit {
    error_count: u32,
    error_dismissed: bool,
    warn_threshold: u32,
    block_threshold: u32,
}

impl Default for SubmissionCircuit {
    fn default() -> Self {
        Self::new(WARN_THRESHOLD, BLOCK_THRESHOLD)
    }
}

impl SubmissionCircuit {
    pub fn new(warn_threshold: u32, block_threshold: u32) -> Self {
        Self {
            error_count: 0,
            error_dismissed: false,
            warn_threshold,
            block_threshold,
        }
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn error_dismissed(&self) -> bool {
        self.error_dismissed
    }

    pub fn warn_threshold(&self) -> u32 {
        self.warn_threshold
    }

    pub fn block_threshold(&self) -> u32 {
        self.block_threshold
    }

    pub fn is_warning(&self) -> bool {
        self.error_count >= self.warn_threshold && !self.error_dismissed
    }

    pub fn is_blocked(&self) -> bool {
        self.error_count >= self.block_threshold && !self.error_dismissed
    }

    pub fn notice(&self) -> Option<SubmissionNotice> {
        let error_count = self.error_count;
        if self.is_blocked() {
            Some(SubmissionNotice::Blocked { error_count })
        } else if self.is_warning() {
            Some(SubmissionNotice::Warning { error_count })
        } else {
            None
        }
    }

    pub fn record_success(&mut self) {
        if self.error_count > 0 {
            info!(
                previous_failures = self.error_count,
                "submission succeeded; circuit closed"
            );
        }
        self.error_count = 0;
        self.error_dismissed = false;
    }

    /// Counts a failure and re-arms a dismissed warning. Returns the notice
    /// the UI should now show, if any.
    pub fn record_failure(&mut self) -> Option<SubmissionNotice> {
        self.error_count = self.error_count.saturating_add(1);
        self.error_dismissed = false;
        let notice = self.notice();
        if let Some(notice) = notice {
            info!(error_count = self.error_count, ?notice, "submission circuit raised notice");
        }
        notice
    }

    pub fn dismiss(&mut self) {
        self.error_dismissed = true;
    }
}
