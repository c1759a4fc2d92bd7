use thiserror::Error;

/// A required build input is missing or inconsistent. Always fatal to the
/// current build and always names the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("Configuration error: required field `{field}` is missing")]
    MissingField { field: &'static str },

    #[error("Configuration error: field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ConfigurationError {
    pub fn missing(field: &'static str) -> Self {
        ConfigurationError::MissingField { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ConfigurationError::MissingField { field } => field,
            ConfigurationError::InvalidField { field, .. } => field,
        }
    }
}

/// Failure reported by the artifact storage collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Artifact not found: {owner}/{project}/{filename}")]
    NotFound {
        owner: String,
        project: String,
        filename: String,
    },

    #[error("Transient storage failure for {location}: {reason}")]
    Retryable { location: String, reason: String },

    #[error("Storage failure for {location}: {reason}")]
    Fatal { location: String, reason: String },
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Retryable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_field() {
        let err = ConfigurationError::missing("project");
        assert_eq!(err.field(), "project");
        assert!(err.to_string().contains("`project`"));

        let err = ConfigurationError::invalid("ram_limit_mb", "must be positive");
        assert_eq!(err.field(), "ram_limit_mb");
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_storage_error_retryable() {
        let err = StorageError::Retryable {
            location: "u/p/f".to_string(),
            reason: "busy".to_string(),
        };
        assert!(err.is_retryable());

        let err = StorageError::NotFound {
            owner: "u".to_string(),
            project: "p".to_string(),
            filename: "f".to_string(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Artifact not found: u/p/f");
    }
}
