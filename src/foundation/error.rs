/// Convenience result type used across the filter engine.
pub type FxResult<T> = Result<T, FxError>;

/// Top-level error taxonomy used by graph construction and evaluation.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// Invalid graph construction: unknown slot or attribute, wrong value shape, missing input,
    /// cycles, or stale handles.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Errors while producing pixels (allocation overflow, mismatched buffers).
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`FxError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
