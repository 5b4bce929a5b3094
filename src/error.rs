//! Error types for related-products

use thiserror::Error;

/// Failures surfaced by the relation store and the admin surfaces
///
/// Bad submitted IDs are never an error; they are dropped on write.
#[derive(Debug, Error)]
pub enum RelatedError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("stored value for {key} on entity {entity} is not valid JSON: {source}")]
    Corrupt {
        entity: u64,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("user '{user}' lacks the '{capability}' capability")]
    Forbidden { user: String, capability: String },

    #[error("request token for '{action}' is missing or invalid")]
    InvalidNonce { action: String },

    #[error("invalid value '{value}' for option {option}")]
    InvalidOption { option: String, value: String },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl RelatedError {
    /// Request-level rejections end the request instead of rendering a page
    pub fn is_request_fatal(&self) -> bool {
        matches!(
            self,
            RelatedError::Forbidden { .. } | RelatedError::InvalidNonce { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RelatedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fatal_errors() {
        assert!(
            RelatedError::Forbidden {
                user: "editor".into(),
                capability: "manage_options".into()
            }
            .is_request_fatal()
        );
        assert!(
            RelatedError::InvalidNonce {
                action: "custom_related_products".into()
            }
            .is_request_fatal()
        );
        assert!(
            !RelatedError::InvalidOption {
                option: "crpr_empty_behavior".into(),
                value: "random".into()
            }
            .is_request_fatal()
        );
    }

    #[test]
    fn test_error_display() {
        let err = RelatedError::InvalidOption {
            option: "crpr_empty_behavior".into(),
            value: "random".into(),
        };
        let display = err.to_string();
        assert!(display.contains("random"));
        assert!(display.contains("crpr_empty_behavior"));
    }
}
