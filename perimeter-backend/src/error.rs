use thiserror::Error;

/// Failure reported by a rule backend. The variant is decided once, at the
/// backend boundary; callers match on it instead of re-inspecting messages.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("rule not found: {0}")]
    NotFound(String),
    #[error("rule already exists: {0}")]
    AlreadyExists(String),
    #[error("provider error: {0}")]
    Provider(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}
