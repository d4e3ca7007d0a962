// src/error.rs
use crate::field::FieldId;
use crate::toggle::Integration;
use crate::validation::ValidationErrors;
use serde_json::json;

/// Failures talking to the organisation settings API.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("Server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Organisation not found: {0}")]
    NotFound(String),

    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl BackendError {
    pub fn code_str(&self) -> &'static str {
        match self {
            BackendError::Io(_) => "io_error",
            BackendError::SerdeJson(_) => "parse_error",
            BackendError::HttpRequest(_) => "upstream_error",
            BackendError::Rejected { .. } => "rejected",
            BackendError::NotFound(_) => "not_found",
            BackendError::InvalidConfig(_) => "invalid_config",
            BackendError::Other(_) => "internal_error",
        }
    }
}

/// Failures raised by the config editor.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("{field} is a {actual} field")]
    FieldKind { field: FieldId, actual: &'static str },

    #[error("{field} cannot be edited while {integration} is disabled")]
    IntegrationDisabled {
        field: FieldId,
        integration: Integration,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl EditorError {
    pub fn code_str(&self) -> &'static str {
        match self {
            EditorError::FieldKind { .. } => "field_kind",
            EditorError::IntegrationDisabled { .. } => "integration_disabled",
            EditorError::Validation(_) => "validation_failed",
            EditorError::Backend(e) => e.code_str(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut value = json!({
            "code": self.code_str(),
            "message": self.to_string(),
        });
        if let EditorError::Validation(errors) = self {
            value["issues"] = json!(errors);
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationIssue;

    #[test]
    fn test_validation_error_json_lists_issues() {
        let err = EditorError::Validation(ValidationErrors(vec![ValidationIssue::MissingRequired {
            integration: Integration::Email,
            field: FieldId::SendgridApiKey,
        }]));
        let value = err.to_json();
        assert_eq!(value["code"], "validation_failed");
        assert_eq!(value["issues"][0]["kind"], "missing_required");
        assert_eq!(value["issues"][0]["field"], "sendgrid_api_key");
    }

    #[test]
    fn test_backend_code_passes_through() {
        let err = EditorError::from(BackendError::Rejected {
            status: 422,
            message: "bad".into(),
        });
        assert_eq!(err.code_str(), "rejected");
    }
}
