use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PermissionError>;

#[derive(Debug, Error)]
pub enum PermissionError {
    #[error("action name must not be empty")]
    InvalidAction,

    #[error("action {0} submitted more than once")]
    DuplicateAction(String),

    #[error("unknown authorization handler: {0}")]
    InvalidHandlerSelection(String),

    #[error("invalid options for {handler}: {reason}")]
    InvalidOptions { handler: String, reason: String },

    #[error("resource permissions are disabled for component {0}")]
    ResourcePermissionsDisabled(String),

    #[error("failed to load permissions: {0}")]
    Storage(#[source] io::Error),

    #[error("failed to save permissions: {0}")]
    PersistenceFailure(#[source] io::Error),

    #[error("corrupt permissions document at {key}: {source}")]
    CorruptDocument {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl PermissionError {
    /// True for errors raised before any document was touched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PermissionError::InvalidAction
                | PermissionError::DuplicateAction(_)
                | PermissionError::InvalidHandlerSelection(_)
                | PermissionError::InvalidOptions { .. }
                | PermissionError::ResourcePermissionsDisabled(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors() {
        assert!(PermissionError::InvalidAction.is_validation());
        assert!(PermissionError::InvalidHandlerSelection("x".to_string()).is_validation());
        assert!(!PermissionError::PersistenceFailure(io::Error::new(io::ErrorKind::Other, "down")).is_validation());
    }

    #[test]
    fn test_error_messages() {
        let err = PermissionError::InvalidOptions {
            handler: "dummy_authorization_handler".to_string(),
            reason: "unknown option foo".to_string(),
        };
        assert_eq!(err.to_string(), "invalid options for dummy_authorization_handler: unknown option foo");
        assert_eq!(PermissionError::DuplicateAction("foo".to_string()).to_string(), "action foo submitted more than once");
    }
}
