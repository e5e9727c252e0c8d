#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A rule registry references something that has no implementation.
    /// Raised at startup only; never reported to the person filling the form.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_configuration() {
        let err = CoreError::Configuration("unknown predicate 'fooCheck'".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown predicate 'fooCheck'"
        );
    }

    #[test]
    fn display_conflict() {
        let err = CoreError::Conflict("form already submitted".to_string());
        assert_eq!(err.to_string(), "Conflict: form already submitted");
    }
}
