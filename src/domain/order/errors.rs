// ============================================================================
// Order Ingestion Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingField(Vec<String>),

    #[error("Order validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Order already exists: {0}")]
    Duplicate(String),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl OrderError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::MissingField(_) => "missing_field",
            OrderError::Validation(_) => "validation",
            OrderError::Duplicate(_) => "duplicate",
            OrderError::NotFound(_) => "not_found",
            OrderError::Unexpected(_) => "unexpected",
        }
    }

    /// Field-level messages for the expected, client-facing failures
    pub fn details(&self) -> Option<&[String]> {
        match self {
            OrderError::MissingField(fields) => Some(fields),
            OrderError::Validation(messages) => Some(messages),
            _ => None,
        }
    }
}
