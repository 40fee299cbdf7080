/// Failure of a single tool call.
///
/// The server renders the `Display` form (`"<kind>: <message>"`) as an error
/// content block; no variant ends the session.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Arguments failed to decode or violate a record invariant.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    /// A record or category referenced by the call does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// Path outside the workspace root.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

#[cfg(test)]
mod tests {
    use super::ToolError;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_prefixes_the_kind() {
        let err = ToolError::NotFound("rule not found: git-009".to_string());
        assert_eq!(err.to_string(), "not found: rule not found: git-009");
        let err = ToolError::PermissionDenied("path is outside workspace root".to_string());
        assert_eq!(err.to_string(), "permission denied: path is outside workspace root");
    }
}
