use serde::{Deserialize, Serialize};
use std::fmt;

/// unique identifier for a loan slip, e.g. "PM001"
pub type LoanId = String;

/// unique identifier for a book
pub type BookId = String;

/// unique identifier for a reader
pub type ReaderId = String;

/// unique identifier for an employee
pub type EmployeeId = String;

/// loan slip status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// books currently on loan
    Active,
    /// slip closed, books accounted for
    Returned,
}

impl LoanStatus {
    pub fn is_returned(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanStatus::Active => write!(f, "currently on loan"),
            LoanStatus::Returned => write!(f, "returned"),
        }
    }
}
