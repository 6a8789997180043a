use thiserror::Error;

use crate::store::StoreError;
use crate::types::{BookId, LoanId, LoanStatus, ReaderId};

/// a single field-level validation failure
///
/// Issues are collected, never short-circuited: one failed request reports
/// every problem it had.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("select at least one book")]
    NoBooksSelected,

    #[error("reader does not exist: {id}")]
    UnknownReader { id: ReaderId },

    #[error("book does not exist: {id}")]
    UnknownBook { id: BookId },

    #[error("book '{name}' ({id}) is out of stock")]
    OutOfStock { id: BookId, name: String },

    #[error("fine for detail {detail_id} cannot be negative")]
    NegativeFine { detail_id: String },
}

#[derive(Error, Debug)]
pub enum CirculationError {
    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("loan slip not found: {id}")]
    LoanNotFound { id: LoanId },

    #[error("only returned loan slips can be deleted: {id} is {status}")]
    DeleteRejected { id: LoanId, status: LoanStatus },

    #[error("failed to create loan slip: {source}")]
    CreateFailed {
        #[source]
        source: StoreError,
    },

    #[error("failed to record return for loan {loan_id}: {source}")]
    ReturnFailed {
        loan_id: LoanId,
        #[source]
        source: StoreError,
    },

    #[error("failed to delete loan {loan_id}: {source}")]
    DeleteFailed {
        loan_id: LoanId,
        #[source]
        source: StoreError,
    },

    #[error("invalid loan policy: {message}")]
    InvalidPolicy { message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CirculationError {
    /// the collected validation issues, if this is a validation failure
    pub fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            CirculationError::Validation(issues) => Some(issues),
            _ => None,
        }
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, CirculationError>;
