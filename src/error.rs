use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the harness core.
///
/// Launch, attach, and navigation failures are fatal and never retried: a
/// retry would re-measure an already-warmed page and corrupt score
/// comparisons. Score-threshold failures are not errors; they are normal
/// [`crate::scoring::AssertionOutcome`] values.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} did not reach network idle within {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("browser session error: {0}")]
    Session(String),

    #[error("audit target `{0}` is not a valid url")]
    InvalidTarget(String),

    #[error("audit engine failed: {0}")]
    Engine(String),

    #[error("malformed audit result: {0}")]
    MalformedResult(#[from] serde_json::Error),

    #[error("failed to persist report at {}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load fixture {}", path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HarnessError>;
