use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanServicingError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanServicingError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LoanServicingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        LoanServicingError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// HTTP status a controller should answer with for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            LoanServicingError::InvalidInput { .. } => 400,
            LoanServicingError::Unauthorized(_) => 401,
            LoanServicingError::NotFound { .. } => 404,
            LoanServicingError::InvalidState(_) | LoanServicingError::Conflict(_) => 409,
            LoanServicingError::DivisionByZero { .. }
            | LoanServicingError::Storage(_)
            | LoanServicingError::SerializationError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for LoanServicingError {
    fn from(e: serde_json::Error) -> Self {
        LoanServicingError::SerializationError(e.to_string())
    }
}
