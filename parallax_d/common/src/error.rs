/// Failures surfaced to the caller by the tracking and retargeting core.
///
/// Unmapped bones and degenerate geometry never show up here: the first are
/// counted in clip diagnostics, the second are clamped where they occur.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParallaxError {
    #[error("Missing target: {0}")]
    MissingTarget(String),
    #[error("Malformed motion source: {reason}")]
    MalformedSource { reason: String },
    #[error("A retarget is already running for this skeleton")]
    RetargetInFlight,
    #[error("Invalid value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl ParallaxError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            reason: reason.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
