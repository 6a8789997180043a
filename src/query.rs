use serde::Serialize;

use crate::model::{Book, Employee, LoanDetail, LoanSlip, Reader};
use crate::store::{LoanStore, StoreError};
use crate::types::LoanStatus;

/// filter for the loan listing
///
/// `search` matches case-insensitively as a substring of the loan id, the
/// reader's full name, or the reader id; blank terms disable the filter.
/// `status` matches exactly. Both filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct LoanFilter {
    pub search: Option<String>,
    pub status: Option<LoanStatus>,
}

impl LoanFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// one detail line with its book eagerly attached
#[derive(Debug, Clone, Serialize)]
pub struct LoanLine {
    pub detail: LoanDetail,
    pub book: Option<Book>,
}

/// a loan slip with reader, employee and per-line books eagerly attached
#[derive(Debug, Clone, Serialize)]
pub struct LoanRecord {
    pub loan: LoanSlip,
    pub reader: Option<Reader>,
    pub employee: Option<Employee>,
    pub lines: Vec<LoanLine>,
}

/// list loan slips, newest loan date first, fully materialized
pub fn list<S: LoanStore>(store: &S, filter: &LoanFilter) -> Result<Vec<LoanRecord>, StoreError> {
    let term = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut records = Vec::new();
    for loan in store.loans()? {
        let reader = store.reader(&loan.reader_id)?;

        if let Some(term) = &term {
            let matches = loan.id.to_lowercase().contains(term)
                || loan.reader_id.to_lowercase().contains(term)
                || reader
                    .as_ref()
                    .map(|r| r.full_name.to_lowercase().contains(term))
                    .unwrap_or(false);
            if !matches {
                continue;
            }
        }

        if let Some(status) = filter.status {
            if loan.status != status {
                continue;
            }
        }

        let employee = store.employee(&loan.employee_id)?;
        let mut lines = Vec::with_capacity(loan.details.len());
        for detail in &loan.details {
            lines.push(LoanLine {
                detail: detail.clone(),
                book: store.book(&detail.book_id)?,
            });
        }

        records.push(LoanRecord {
            loan,
            reader,
            employee,
            lines,
        });
    }

    records.sort_by(|a, b| b.loan.loan_date.cmp(&a.loan.loan_date));
    Ok(records)
}
