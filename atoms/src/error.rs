use thiserror::Error;

/// Failure modes for task operations. Each variant maps to exactly one
/// HTTP status in the handler layer.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A request field failed validation; the request had no side effect.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The task id is unknown.
    #[error("task not found")]
    NotFound,

    /// The task belongs to another user. No mutation happened and no task
    /// content is disclosed.
    #[error("task belongs to another user")]
    Forbidden,

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(String),
}

impl TaskError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        TaskError::Validation {
            field,
            message: message.into(),
        }
    }
}
