use thiserror::Error;

/// Rejected configuration or content. Runtime misuse (unknown navigation
/// targets, stale timers, double teardown) is never an error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no navigation sections to register")]
    NoSections,
    #[error("navigation section `{0}` registered twice")]
    DuplicateSection(String),
    #[error("sections are already registered")]
    SectionsAlreadyRegistered,
    #[error("typewriter needs at least one keyword")]
    NoKeywords,
    #[error("typewriter keyword {0} is empty")]
    EmptyKeyword(usize),
    #[error("loading sequence needs at least one phase message")]
    NoLoadingMessages,
    #[error("`{0}` must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("tween {index}: {reason}")]
    InvalidTween { index: usize, reason: &'static str },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
