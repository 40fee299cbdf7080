//! Error types for record store operations.

/// Errors returned by record stores and the retrieval pipeline.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error while writing the backing file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    /// No record with the given id exists.
    #[error("{noun} not found: {id}")]
    NotFound { noun: &'static str, id: String },
    /// The category is not known to the category index.
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    /// A required field is missing or a value is malformed.
    #[error("validation error: {0}")]
    Validation(String),
    /// A record with the same id is already stored.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// The query text could not be compiled as a match pattern.
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

impl From<StoreError> for keeper_rs_protocol::ToolError {
    fn from(err: StoreError) -> Self {
        use keeper_rs_protocol::ToolError;
        match err {
            StoreError::NotFound { .. } | StoreError::CategoryNotFound(_) => {
                ToolError::NotFound(err.to_string())
            }
            StoreError::Validation(message) => ToolError::InvalidArguments(message),
            StoreError::DuplicateId(_) => ToolError::InvalidArguments(err.to_string()),
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use keeper_rs_protocol::ToolError;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_to_tool_error_kinds() {
        let err = ToolError::from(StoreError::NotFound {
            noun: "rule",
            id: "git-001".to_string(),
        });
        assert_eq!(err.to_string(), "not found: rule not found: git-001");

        let err = ToolError::from(StoreError::CategoryNotFound("docker".to_string()));
        assert!(matches!(err, ToolError::NotFound(_)));

        let err = ToolError::from(StoreError::Validation("title is required".to_string()));
        assert_eq!(err.to_string(), "invalid arguments: title is required");

        let err = ToolError::from(StoreError::DuplicateId("git-003".to_string()));
        assert_eq!(err.to_string(), "invalid arguments: duplicate id: git-003");

        let err = ToolError::from(StoreError::Pattern("bad".to_string()));
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }
}
