use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{BookId, EmployeeId, LoanId, LoanStatus, ReaderId};

/// a catalogued book
///
/// `quantity` is a maintained counter, not the source of truth: at every
/// committed state it equals the initial stock minus the number of open loan
/// details referencing this book. Only the inventory ledger mutates it. The
/// field is signed because the ledger has no negative guard (see
/// [`crate::ledger`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    pub quantity: i64,
    pub author_id: Option<String>,
    pub category_id: Option<String>,
    pub publisher_id: Option<String>,
}

impl Book {
    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// a registered reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub full_name: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
}

/// a library employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub full_name: String,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<String>,
}

/// a borrowing transaction header covering one or more books for one reader
///
/// The slip owns its detail lines; they are created, persisted and deleted
/// together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSlip {
    pub id: LoanId,
    pub reader_id: ReaderId,
    pub employee_id: EmployeeId,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub details: Vec<LoanDetail>,
}

impl LoanSlip {
    pub fn detail(&self, detail_id: &str) -> Option<&LoanDetail> {
        self.details.iter().find(|d| d.id == detail_id)
    }

    pub fn is_returned(&self) -> bool {
        self.status.is_returned()
    }
}

/// one book-line within a loan slip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetail {
    pub id: String,
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub loan_condition: String,
    pub return_condition: Option<String>,
    pub lost: bool,
    pub fine: Money,
}

impl LoanDetail {
    /// composite detail identifier: `"{loan_id}-{book_id}"`
    pub fn compose_id(loan_id: &str, book_id: &str) -> String {
        format!("{}-{}", loan_id, book_id)
    }
}
