use thiserror::Error;

/// Errors surfaced by tween configuration and time injection.
///
/// Redundant calls (double play, pausing a paused tween, killing twice,
/// advancing something that is not playing) are no-ops, never errors.
#[derive(Debug, Error)]
pub enum TweenError {
    /// Invalid duration, missing accessor, or conflicting loop settings.
    #[error("invalid tween configuration: {0}")]
    Configuration(String),

    /// Time must move forward by a finite amount.
    #[error("invalid time delta {0}: must be finite and non-negative")]
    InvalidTime(f32),

    #[error("failed to parse scheduler config: {0}")]
    Config(#[from] serde_json::Error),
}

impl TweenError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        TweenError::Configuration(msg.into())
    }
}

/// Reject negative, NaN or infinite deltas.
pub(crate) fn check_delta(dt: f32) -> Result<(), TweenError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(TweenError::InvalidTime(dt))
    }
}
