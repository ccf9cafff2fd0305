use std::fmt;

use thiserror::Error;

use perimeter_backend::BackendError;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl RuleError {
    /// True when the underlying backend reported a missing rule; the HTTP
    /// boundary uses this to answer 404 on single-rule lookups.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RuleError::Backend(err) if err.is_not_found())
    }
}

/// One rule's failure within a batch, tagged with the scope-local name.
#[derive(Debug)]
pub struct RuleFailure {
    pub custom_name: String,
    pub error: BackendError,
}

/// Aggregate outcome of a batch where at least one rule failed. Every failure
/// is kept; the batch never collapses to a single "something failed".
#[derive(Debug)]
pub struct BatchError {
    pub failures: Vec<RuleFailure>,
}

impl BatchError {
    pub fn new(failures: Vec<RuleFailure>) -> Self {
        Self { failures }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule(s) failed:", self.failures.len())?;
        for failure in &self.failures {
            write!(f, " [{}: {}]", failure.custom_name, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for BatchError {}

#[cfg(test)]
mod tests {
    use perimeter_backend::BackendError;

    use super::{BatchError, RuleError, RuleFailure};

    #[test]
    fn batch_display_enumerates_every_failure() {
        let err = BatchError::new(vec![
            RuleFailure {
                custom_name: "allow-ssh".to_string(),
                error: BackendError::AlreadyExists("svc-app-allow-ssh".to_string()),
            },
            RuleFailure {
                custom_name: "allow-https".to_string(),
                error: BackendError::Provider("quota exceeded".to_string()),
            },
        ]);

        let message = err.to_string();
        assert!(message.starts_with("2 rule(s) failed:"));
        assert!(message.contains("allow-ssh"));
        assert!(message.contains("allow-https"));
        assert!(message.contains("quota exceeded"));
    }

    #[test]
    fn not_found_is_distinguishable() {
        let missing = RuleError::Backend(BackendError::NotFound("gone".to_string()));
        let generic = RuleError::Backend(BackendError::Provider("boom".to_string()));
        assert!(missing.is_not_found());
        assert!(!generic.is_not_found());
    }
}
