//! Lifecycle phases of a crawl session
//!
//! A session moves strictly forward: `Idle → Running → Terminating → Done`.
//! Loading a checkpoint is only possible while `Idle`, and the final checkpoint
//! is written exactly once, on the edge into `Terminating`.
use std::fmt;

/// Represents the current phase of a crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Startup =====
    /// Session constructed; state may still be replaced by a checkpoint
    Idle,

    // ===== Active =====
    /// Crawl loop is dequeuing and fetching
    Running,

    // ===== Shutdown =====
    /// Frontier exhausted or interrupt received; final work in progress
    Terminating,

    /// Session finished; no further transitions
    Done,
}

impl CrawlPhase {
    /// Returns true if the crawl loop may process URLs
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns true if the session has begun shutting down or has finished
    pub fn is_shutting_down(&self) -> bool {
        matches!(self, Self::Terminating | Self::Done)
    }

    /// Returns true if the live state may be replaced wholesale
    pub fn accepts_resume(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Terminating)
                | (Self::Running, Self::Terminating)
                | (Self::Terminating, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Terminating => "terminating",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
