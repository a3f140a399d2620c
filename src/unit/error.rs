use thiserror::Error;

use super::ControlId;

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unit has no control with id {0}")]
    UnknownControl(ControlId),

    #[error("control {id} takes a {expected} value, got {actual}")]
    TypeMismatch {
        id: ControlId,
        expected: String,
        actual: &'static str,
    },

    #[error("control {id} refused the value: {reason}")]
    Rejected { id: ControlId, reason: String },

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("device error: {0}")]
    Io(#[from] std::io::Error),
}
