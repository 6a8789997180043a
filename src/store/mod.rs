use thiserror::Error;

use crate::model::{Book, Employee, LoanSlip, Reader};

pub mod memory;

/// errors surfaced by the persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a transaction is already in progress")]
    TransactionActive,

    #[error("no transaction in progress")]
    NoTransaction,

    #[error("commit failed: {message}")]
    CommitFailed { message: String },

    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    #[error("no row for key: {key}")]
    MissingRow { key: String },

    #[error("state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// minimal contract over the transactional relational store
///
/// All writes issued between `begin` and `commit` land together or not at
/// all; `rollback` discards every write since `begin`. A loan slip is stored
/// as an aggregate, so its detail lines travel with it on insert, update and
/// removal.
pub trait LoanStore {
    fn book(&self, id: &str) -> Result<Option<Book>, StoreError>;
    fn reader(&self, id: &str) -> Result<Option<Reader>, StoreError>;
    fn employee(&self, id: &str) -> Result<Option<Employee>, StoreError>;
    fn loan(&self, id: &str) -> Result<Option<LoanSlip>, StoreError>;
    fn loans(&self) -> Result<Vec<LoanSlip>, StoreError>;

    fn insert_book(&mut self, book: Book) -> Result<(), StoreError>;
    fn insert_reader(&mut self, reader: Reader) -> Result<(), StoreError>;
    fn insert_employee(&mut self, employee: Employee) -> Result<(), StoreError>;
    fn insert_loan(&mut self, loan: LoanSlip) -> Result<(), StoreError>;
    fn update_book(&mut self, book: Book) -> Result<(), StoreError>;
    fn update_loan(&mut self, loan: LoanSlip) -> Result<(), StoreError>;
    fn remove_loan(&mut self, id: &str) -> Result<(), StoreError>;

    fn begin(&mut self) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    /// discard writes since `begin`; a no-op when no transaction is open
    fn rollback(&mut self) -> Result<(), StoreError>;
}
