use crate::{ParamKind, constraint::ConstraintError};
use thiserror::Error as ThisError;

///
/// Error
///
/// Runtime errors surfaced by accessor sets, choice tables and dialogs.
/// Malformed store contents are never reported here; they fall back to the
/// default and are logged.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{class}: parameter index {index} out of range (len {len})")]
    IndexOutOfRange {
        class: String,
        index: usize,
        len: usize,
    },

    #[error("{class}.{name}: expected {expected}, got {got}")]
    KindMismatch {
        class: String,
        name: String,
        expected: ParamKind,
        got: &'static str,
    },

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("unknown identifier '{name}' in {set}")]
    UnknownIdentifier { set: String, name: String },

    #[error("{class}.{name} does not emit change notifications")]
    NotObservable {
        class: String,
        name: String,
    },

    #[error("invalid parameter table for {class}: {reason}")]
    InvalidTable { class: String, reason: String },

    #[error("unknown parameter class '{0}'")]
    UnknownClass(String),

    #[error("dialog extension '{0}' is not installed")]
    UnknownExtension(String),

    #[error("unknown dialog control '{0}'")]
    UnknownControl(String),

    #[error("control '{id}' cannot hold {value}")]
    ControlValue { id: String, value: String },
}
