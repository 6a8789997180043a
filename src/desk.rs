use chrono::{DateTime, Duration, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LoanPolicy;
use crate::decimal::Money;
use crate::errors::{CirculationError, Result, ValidationIssue};
use crate::events::{Event, EventStore};
use crate::identifier;
use crate::ledger::InventoryLedger;
use crate::model::{Book, LoanDetail, LoanSlip};
use crate::query::{self, LoanFilter, LoanRecord};
use crate::store::{LoanStore, StoreError};
use crate::types::{BookId, EmployeeId, LoanId, LoanStatus, ReaderId};

/// a loan creation request
///
/// The acting employee is an explicit parameter rather than ambient session
/// state. Dates left unset fall back to the policy: loan date = today, due
/// date = loan date + loan period.
#[derive(Debug, Clone)]
pub struct LoanRequest {
    pub reader_id: ReaderId,
    pub employee_id: EmployeeId,
    pub loan_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub book_ids: Vec<BookId>,
}

/// one submitted line of a return form
#[derive(Debug, Clone)]
pub struct ReturnLine {
    pub detail_id: String,
    pub condition: String,
    pub lost: bool,
    pub fine: Money,
}

/// audit trail entry for a committed operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: Uuid,
    pub loan_id: LoanId,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    fn capture(loan_id: &str, action: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            entry_id: Uuid::new_v4(),
            loan_id: loan_id.to_string(),
            action: action.to_string(),
            timestamp,
        }
    }
}

/// the loan transaction coordinator
///
/// Owns the store handle and orchestrates create / return / delete as
/// all-or-nothing transactions: every write of an operation lands, or none
/// do. One logical request per transaction; there is no cross-request
/// coordination, so two concurrent creates that both observe `quantity > 0`
/// can still under-flow the same book (see the module docs on `ledger`).
pub struct CirculationDesk<S> {
    store: S,
    policy: LoanPolicy,
    pub events: EventStore,
    audit: Vec<AuditEntry>,
}

impl<S: LoanStore> CirculationDesk<S> {
    /// desk with the standard policy
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: LoanPolicy::standard(),
            events: EventStore::new(),
            audit: Vec::new(),
        }
    }

    /// desk with a custom, validated policy
    pub fn with_policy(store: S, policy: LoanPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            store,
            policy,
            events: EventStore::new(),
            audit: Vec::new(),
        })
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit
    }

    /// create a loan slip for the requested books
    ///
    /// Validation issues are collected, not short-circuited; any issue means
    /// no side effects at all. A store failure after the transaction opens
    /// rolls everything back, including quantity decrements.
    pub fn create_loan(
        &mut self,
        request: LoanRequest,
        time: &SafeTimeProvider,
    ) -> Result<LoanSlip> {
        let mut issues = Vec::new();

        if request.book_ids.is_empty() {
            issues.push(ValidationIssue::NoBooksSelected);
        }

        if self.store.reader(&request.reader_id)?.is_none() {
            issues.push(ValidationIssue::UnknownReader {
                id: request.reader_id.clone(),
            });
        }

        // duplicate selections collapse to one line per book
        let mut to_loan: Vec<Book> = Vec::new();
        for book_id in &request.book_ids {
            if to_loan.iter().any(|b| &b.id == book_id) {
                continue;
            }
            match self.store.book(book_id)? {
                None => issues.push(ValidationIssue::UnknownBook {
                    id: book_id.clone(),
                }),
                Some(book) if !book.in_stock() => issues.push(ValidationIssue::OutOfStock {
                    id: book_id.clone(),
                    name: book.name,
                }),
                Some(book) => to_loan.push(book),
            }
        }

        if !issues.is_empty() {
            return Err(CirculationError::Validation(issues));
        }

        let today = time.now().date_naive();
        let loan_date = request.loan_date.unwrap_or(today);
        let due_date = request
            .due_date
            .unwrap_or(loan_date + Duration::days(self.policy.loan_period_days));

        self.store
            .begin()
            .map_err(|source| CirculationError::CreateFailed { source })?;

        match self.stage_create(&request, to_loan, loan_date, due_date) {
            Ok((loan, staged_books)) => {
                let timestamp = time.now();
                self.events.emit(Event::LoanCreated {
                    loan_id: loan.id.clone(),
                    reader_id: loan.reader_id.clone(),
                    employee_id: loan.employee_id.clone(),
                    book_count: loan.details.len(),
                    reference: format!("txn-{}", Uuid::new_v4()),
                    timestamp,
                });
                for book in &staged_books {
                    self.events.emit(Event::BookCheckedOut {
                        loan_id: loan.id.clone(),
                        book_id: book.id.clone(),
                        remaining: book.quantity,
                        timestamp,
                    });
                }
                self.audit.push(AuditEntry::capture(&loan.id, "create", timestamp));
                Ok(loan)
            }
            Err(source) => {
                let _ = self.store.rollback();
                Err(CirculationError::CreateFailed { source })
            }
        }
    }

    fn stage_create(
        &mut self,
        request: &LoanRequest,
        to_loan: Vec<Book>,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> std::result::Result<(LoanSlip, Vec<Book>), StoreError> {
        let existing = self.store.loans()?;
        let loan_id = identifier::next_loan_id(
            existing.iter().map(|l| l.id.as_str()),
            &self.policy.id_prefix,
            self.policy.id_width,
        );

        let mut ledger = InventoryLedger::new();
        let mut details = Vec::with_capacity(to_loan.len());
        for book in &to_loan {
            details.push(LoanDetail {
                id: LoanDetail::compose_id(&loan_id, &book.id),
                loan_id: loan_id.clone(),
                book_id: book.id.clone(),
                loan_condition: self.policy.default_condition.clone(),
                return_condition: None,
                lost: false,
                fine: Money::ZERO,
            });
            ledger.checkout(book);
        }

        let loan = LoanSlip {
            id: loan_id,
            reader_id: request.reader_id.clone(),
            employee_id: request.employee_id.clone(),
            loan_date,
            due_date,
            return_date: None,
            status: LoanStatus::Active,
            details,
        };

        self.store.insert_loan(loan.clone())?;
        let staged_books = ledger.into_changed();
        for book in &staged_books {
            self.store.update_book(book.clone())?;
        }
        self.store.commit()?;

        Ok((loan, staged_books))
    }

    /// record the return of a loan slip
    ///
    /// Submitted lines with no matching detail are ignored. Books on lines
    /// not flagged lost go back into stock; lost books stay decremented. The
    /// slip is closed regardless of individual lost flags.
    ///
    /// There is no re-return guard here: calling this on an already returned
    /// slip runs the restock again. Callers that redisplay loans are
    /// expected to steer returned slips away before submitting.
    pub fn return_loan(
        &mut self,
        loan_id: &str,
        lines: &[ReturnLine],
        time: &SafeTimeProvider,
    ) -> Result<LoanSlip> {
        let issues: Vec<ValidationIssue> = lines
            .iter()
            .filter(|line| line.fine.is_negative())
            .map(|line| ValidationIssue::NegativeFine {
                detail_id: line.detail_id.clone(),
            })
            .collect();
        if !issues.is_empty() {
            return Err(CirculationError::Validation(issues));
        }

        self.store.begin().map_err(|source| CirculationError::ReturnFailed {
            loan_id: loan_id.to_string(),
            source,
        })?;

        let mut loan = match self.store.loan(loan_id) {
            Ok(Some(loan)) => loan,
            Ok(None) => {
                let _ = self.store.rollback();
                return Err(CirculationError::LoanNotFound {
                    id: loan_id.to_string(),
                });
            }
            Err(source) => {
                let _ = self.store.rollback();
                return Err(CirculationError::ReturnFailed {
                    loan_id: loan_id.to_string(),
                    source,
                });
            }
        };

        match self.stage_return(&mut loan, lines, time) {
            Ok((restocked, written_off)) => {
                let timestamp = time.now();
                self.events.emit(Event::LoanReturned {
                    loan_id: loan.id.clone(),
                    reader_id: loan.reader_id.clone(),
                    timestamp,
                });
                for book in &restocked {
                    self.events.emit(Event::BookRestocked {
                        loan_id: loan.id.clone(),
                        book_id: book.id.clone(),
                        quantity: book.quantity,
                        timestamp,
                    });
                }
                for (book_id, fine) in written_off {
                    self.events.emit(Event::BookWrittenOff {
                        loan_id: loan.id.clone(),
                        book_id,
                        fine,
                        timestamp,
                    });
                }
                self.audit.push(AuditEntry::capture(&loan.id, "return", timestamp));
                Ok(loan)
            }
            Err(source) => {
                let _ = self.store.rollback();
                Err(CirculationError::ReturnFailed {
                    loan_id: loan_id.to_string(),
                    source,
                })
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn stage_return(
        &mut self,
        loan: &mut LoanSlip,
        lines: &[ReturnLine],
        time: &SafeTimeProvider,
    ) -> std::result::Result<(Vec<Book>, Vec<(BookId, Money)>), StoreError> {
        let mut ledger = InventoryLedger::new();
        let mut written_off = Vec::new();

        for line in lines {
            let Some(detail) = loan.details.iter_mut().find(|d| d.id == line.detail_id) else {
                continue;
            };
            detail.return_condition = Some(line.condition.clone());
            detail.lost = line.lost;
            detail.fine = line.fine;

            if line.lost {
                written_off.push((detail.book_id.clone(), detail.fine));
            } else if let Some(book) = self.store.book(&detail.book_id)? {
                ledger.restock(&book);
            }
        }

        loan.return_date = Some(time.now().date_naive());
        loan.status = LoanStatus::Returned;

        self.store.update_loan(loan.clone())?;
        let restocked = ledger.into_changed();
        for book in &restocked {
            self.store.update_book(book.clone())?;
        }
        self.store.commit()?;

        Ok((restocked, written_off))
    }

    /// delete a returned loan slip together with its detail lines
    ///
    /// Rejected for anything not yet returned. Quantities are not
    /// re-adjusted; they were settled at return time.
    pub fn delete_loan(&mut self, loan_id: &str, time: &SafeTimeProvider) -> Result<()> {
        let loan = self
            .store
            .loan(loan_id)?
            .ok_or_else(|| CirculationError::LoanNotFound {
                id: loan_id.to_string(),
            })?;

        if !loan.is_returned() {
            return Err(CirculationError::DeleteRejected {
                id: loan.id,
                status: loan.status,
            });
        }

        self.store.begin().map_err(|source| CirculationError::DeleteFailed {
            loan_id: loan_id.to_string(),
            source,
        })?;

        match self
            .store
            .remove_loan(loan_id)
            .and_then(|_| self.store.commit())
        {
            Ok(()) => {
                let timestamp = time.now();
                self.events.emit(Event::LoanDeleted {
                    loan_id: loan_id.to_string(),
                    timestamp,
                });
                self.audit.push(AuditEntry::capture(loan_id, "delete", timestamp));
                Ok(())
            }
            Err(source) => {
                let _ = self.store.rollback();
                Err(CirculationError::DeleteFailed {
                    loan_id: loan_id.to_string(),
                    source,
                })
            }
        }
    }

    /// read-side listing, filtered and ordered (see [`crate::query`])
    pub fn list(&self, filter: &LoanFilter) -> Result<Vec<LoanRecord>> {
        Ok(query::list(&self.store, filter)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Reader};
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;

    fn book(id: &str, name: &str, quantity: i64) -> Book {
        Book {
            id: id.to_string(),
            name: name.to_string(),
            quantity,
            author_id: Some("TG001".to_string()),
            category_id: Some("TL001".to_string()),
            publisher_id: Some("NXB001".to_string()),
        }
    }

    fn seeded_desk() -> CirculationDesk<MemoryStore> {
        let mut store = MemoryStore::new();
        store
            .insert_reader(Reader {
                id: "DG001".to_string(),
                full_name: "Tran Thi Mai".to_string(),
                email: None,
                telephone: None,
            })
            .unwrap();
        store
            .insert_employee(Employee {
                id: "NV001".to_string(),
                full_name: "Le Van Binh".to_string(),
                email: None,
                telephone: None,
                role: Some("Librarian".to_string()),
            })
            .unwrap();
        store.insert_book(book("S001", "Rust in Action", 1)).unwrap();
        store.insert_book(book("S002", "The Art of SQL", 0)).unwrap();
        store.insert_book(book("S003", "Clean Code", 4)).unwrap();
        CirculationDesk::new(store)
    }

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn request(book_ids: &[&str]) -> LoanRequest {
        LoanRequest {
            reader_id: "DG001".to_string(),
            employee_id: "NV001".to_string(),
            loan_date: None,
            due_date: None,
            book_ids: book_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_with_empty_selection_fails() {
        let mut desk = seeded_desk();
        let err = desk.create_loan(request(&[]), &clock()).unwrap_err();

        let issues = err.validation_issues().unwrap();
        assert!(issues.contains(&ValidationIssue::NoBooksSelected));
        assert!(desk.store().loans().unwrap().is_empty());
    }

    #[test]
    fn test_validation_issues_are_collected_not_short_circuited() {
        let mut desk = seeded_desk();
        let mut req = request(&["S001", "SX99"]);
        req.reader_id = "DG999".to_string();

        let err = desk.create_loan(req, &clock()).unwrap_err();
        let issues = err.validation_issues().unwrap();

        assert!(issues.contains(&ValidationIssue::UnknownReader {
            id: "DG999".to_string()
        }));
        assert!(issues.contains(&ValidationIssue::UnknownBook {
            id: "SX99".to_string()
        }));
        // the valid book was not touched
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 1);
        assert!(desk.store().loans().unwrap().is_empty());
    }

    #[test]
    fn test_create_single_book_with_quantity_one() {
        let mut desk = seeded_desk();
        let loan = desk.create_loan(request(&["S001"]), &clock()).unwrap();

        assert_eq!(loan.id, "PM001");
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.loan_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(loan.due_date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(loan.details.len(), 1);

        let detail = &loan.details[0];
        assert_eq!(detail.id, "PM001-S001");
        assert_eq!(detail.loan_condition, "Good");
        assert!(!detail.lost);
        assert!(detail.fine.is_zero());

        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 0);

        let events = desk.events.take_events();
        assert!(matches!(events[0], Event::LoanCreated { ref loan_id, book_count: 1, .. } if loan_id == "PM001"));
        assert!(matches!(events[1], Event::BookCheckedOut { remaining: 0, .. }));
    }

    #[test]
    fn test_create_fails_entirely_when_one_book_out_of_stock() {
        let mut desk = seeded_desk();
        let err = desk
            .create_loan(request(&["S001", "S002"]), &clock())
            .unwrap_err();

        let issues = err.validation_issues().unwrap();
        assert_eq!(
            issues,
            &[ValidationIssue::OutOfStock {
                id: "S002".to_string(),
                name: "The Art of SQL".to_string()
            }]
        );
        // atomic across the whole batch: neither quantity moved, no slip
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 1);
        assert_eq!(desk.store().book("S002").unwrap().unwrap().quantity, 0);
        assert!(desk.store().loans().unwrap().is_empty());
    }

    #[test]
    fn test_create_rolls_back_on_commit_failure() {
        let mut desk = seeded_desk();
        desk.store_mut().poison_commits(1);

        let err = desk.create_loan(request(&["S003"]), &clock()).unwrap_err();
        assert!(matches!(err, CirculationError::CreateFailed { .. }));
        assert!(err.to_string().contains("injected commit failure"));

        assert_eq!(desk.store().book("S003").unwrap().unwrap().quantity, 4);
        assert!(desk.store().loans().unwrap().is_empty());
        assert!(desk.events.events().is_empty());
    }

    #[test]
    fn test_sequential_identifiers() {
        let mut desk = seeded_desk();
        let time = clock();
        let first = desk.create_loan(request(&["S003"]), &time).unwrap();
        let second = desk.create_loan(request(&["S003"]), &time).unwrap();

        assert_eq!(first.id, "PM001");
        assert_eq!(second.id, "PM002");
    }

    #[test]
    fn test_duplicate_book_selection_collapses_to_one_line() {
        let mut desk = seeded_desk();
        let loan = desk
            .create_loan(request(&["S003", "S003"]), &clock())
            .unwrap();

        assert_eq!(loan.details.len(), 1);
        assert_eq!(desk.store().book("S003").unwrap().unwrap().quantity, 3);
    }

    #[test]
    fn test_explicit_dates_are_honored() {
        let mut desk = seeded_desk();
        let mut req = request(&["S003"]);
        req.loan_date = NaiveDate::from_ymd_opt(2024, 2, 20);
        req.due_date = NaiveDate::from_ymd_opt(2024, 2, 27);

        let loan = desk.create_loan(req, &clock()).unwrap();
        assert_eq!(loan.loan_date, NaiveDate::from_ymd_opt(2024, 2, 20).unwrap());
        assert_eq!(loan.due_date, NaiveDate::from_ymd_opt(2024, 2, 27).unwrap());
    }

    #[test]
    fn test_return_restocks_kept_books_but_not_lost_ones() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk
            .create_loan(request(&["S001", "S003"]), &time)
            .unwrap();
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 0);
        assert_eq!(desk.store().book("S003").unwrap().unwrap().quantity, 3);
        desk.events.clear();

        let lines = vec![
            ReturnLine {
                detail_id: "PM001-S001".to_string(),
                condition: "Good".to_string(),
                lost: false,
                fine: Money::ZERO,
            },
            ReturnLine {
                detail_id: "PM001-S003".to_string(),
                condition: "Lost".to_string(),
                lost: true,
                fine: Money::from_decimal(dec!(120.00)),
            },
        ];
        let returned = desk.return_loan(&loan.id, &lines, &time).unwrap();

        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(
            returned.return_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        // kept book goes back to stock, lost book stays decremented
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 1);
        assert_eq!(desk.store().book("S003").unwrap().unwrap().quantity, 3);

        let lost_detail = returned.detail("PM001-S003").unwrap();
        assert!(lost_detail.lost);
        assert_eq!(lost_detail.fine, Money::from_decimal(dec!(120.00)));
        assert_eq!(lost_detail.return_condition.as_deref(), Some("Lost"));

        let events = desk.events.take_events();
        assert!(events.iter().any(|e| matches!(e, Event::LoanReturned { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::BookRestocked { book_id, quantity: 1, .. } if book_id == "S001")));
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::BookWrittenOff { book_id, .. } if book_id == "S003")));
    }

    #[test]
    fn test_return_ignores_unmatched_lines() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();

        let lines = vec![ReturnLine {
            detail_id: "PM001-BOGUS".to_string(),
            condition: "Good".to_string(),
            lost: false,
            fine: Money::ZERO,
        }];
        let returned = desk.return_loan(&loan.id, &lines, &time).unwrap();

        // the slip still closes; the stray line changed nothing
        assert_eq!(returned.status, LoanStatus::Returned);
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 0);
        assert!(returned.details[0].return_condition.is_none());
    }

    #[test]
    fn test_return_unknown_loan_is_not_found() {
        let mut desk = seeded_desk();
        let err = desk.return_loan("PM999", &[], &clock()).unwrap_err();
        assert!(matches!(err, CirculationError::LoanNotFound { .. }));
    }

    #[test]
    fn test_double_return_double_increments() {
        // current behavior: nothing blocks returning an already returned
        // slip, so the restock runs twice and the quantity drifts upward
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();

        let lines = vec![ReturnLine {
            detail_id: "PM001-S001".to_string(),
            condition: "Good".to_string(),
            lost: false,
            fine: Money::ZERO,
        }];
        desk.return_loan(&loan.id, &lines, &time).unwrap();
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 1);

        desk.return_loan(&loan.id, &lines, &time).unwrap();
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 2);
    }

    #[test]
    fn test_return_rolls_back_on_commit_failure() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();

        desk.store_mut().poison_commits(1);
        let lines = vec![ReturnLine {
            detail_id: "PM001-S001".to_string(),
            condition: "Good".to_string(),
            lost: false,
            fine: Money::ZERO,
        }];
        let err = desk.return_loan(&loan.id, &lines, &time).unwrap_err();

        assert!(
            matches!(err, CirculationError::ReturnFailed { ref loan_id, .. } if loan_id == "PM001")
        );
        // the slip is untouched and can be redisplayed for correction
        let reloaded = desk.store().loan("PM001").unwrap().unwrap();
        assert_eq!(reloaded.status, LoanStatus::Active);
        assert!(reloaded.return_date.is_none());
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_negative_fine_rejected_before_transaction() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();

        let lines = vec![ReturnLine {
            detail_id: "PM001-S001".to_string(),
            condition: "Damaged".to_string(),
            lost: false,
            fine: Money::from_major(-5),
        }];
        let err = desk.return_loan(&loan.id, &lines, &time).unwrap_err();

        let issues = err.validation_issues().unwrap();
        assert!(matches!(issues[0], ValidationIssue::NegativeFine { .. }));
        assert_eq!(
            desk.store().loan("PM001").unwrap().unwrap().status,
            LoanStatus::Active
        );
    }

    #[test]
    fn test_delete_active_loan_rejected() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();

        let err = desk.delete_loan(&loan.id, &time).unwrap_err();
        assert!(matches!(
            err,
            CirculationError::DeleteRejected {
                status: LoanStatus::Active,
                ..
            }
        ));
        // zero rows changed
        assert!(desk.store().loan("PM001").unwrap().is_some());
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_delete_returned_loan_removes_slip_and_details() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();
        let lines = vec![ReturnLine {
            detail_id: "PM001-S001".to_string(),
            condition: "Good".to_string(),
            lost: false,
            fine: Money::ZERO,
        }];
        desk.return_loan(&loan.id, &lines, &time).unwrap();

        desk.delete_loan(&loan.id, &time).unwrap();

        assert!(desk.store().loan("PM001").unwrap().is_none());
        // quantities were settled at return time; delete does not touch them
        assert_eq!(desk.store().book("S001").unwrap().unwrap().quantity, 1);
    }

    #[test]
    fn test_delete_unknown_loan_is_not_found() {
        let mut desk = seeded_desk();
        let err = desk.delete_loan("PM404", &clock()).unwrap_err();
        assert!(matches!(err, CirculationError::LoanNotFound { .. }));
    }

    #[test]
    fn test_audit_trail_records_committed_operations() {
        let mut desk = seeded_desk();
        let time = clock();
        let loan = desk.create_loan(request(&["S001"]), &time).unwrap();
        let lines = vec![ReturnLine {
            detail_id: "PM001-S001".to_string(),
            condition: "Good".to_string(),
            lost: false,
            fine: Money::ZERO,
        }];
        desk.return_loan(&loan.id, &lines, &time).unwrap();
        desk.delete_loan(&loan.id, &time).unwrap();

        let actions: Vec<&str> = desk.audit_log().iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, ["create", "return", "delete"]);
    }
}
