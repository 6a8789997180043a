use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Book, Employee, LoanSlip, Reader};

use super::{LoanStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    books: BTreeMap<String, Book>,
    readers: BTreeMap<String, Reader>,
    employees: BTreeMap<String, Employee>,
    loans: BTreeMap<String, LoanSlip>,
}

/// in-memory reference implementation of [`LoanStore`]
///
/// Transactions are checkpoint-based: `begin` snapshots the tables,
/// `rollback` restores the snapshot, `commit` drops it. Commit failures can
/// be injected with [`MemoryStore::poison_commits`] to exercise rollback
/// paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Tables,
    checkpoint: Option<Tables>,
    poisoned_commits: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// make the next `n` commits fail, leaving the transaction open so the
    /// caller still decides between retry and rollback
    pub fn poison_commits(&mut self, n: u32) {
        self.poisoned_commits = n;
    }

    /// serialize all tables to JSON
    pub fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.tables)?)
    }

    /// replace all tables from a JSON export; refused mid-transaction
    pub fn import_json(&mut self, json: &str) -> Result<(), StoreError> {
        if self.checkpoint.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.tables = serde_json::from_str(json)?;
        Ok(())
    }
}

fn insert_row<T>(table: &mut BTreeMap<String, T>, key: String, row: T) -> Result<(), StoreError> {
    if table.contains_key(&key) {
        return Err(StoreError::DuplicateKey { key });
    }
    table.insert(key, row);
    Ok(())
}

impl LoanStore for MemoryStore {
    fn book(&self, id: &str) -> Result<Option<Book>, StoreError> {
        Ok(self.tables.books.get(id).cloned())
    }

    fn reader(&self, id: &str) -> Result<Option<Reader>, StoreError> {
        Ok(self.tables.readers.get(id).cloned())
    }

    fn employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.tables.employees.get(id).cloned())
    }

    fn loan(&self, id: &str) -> Result<Option<LoanSlip>, StoreError> {
        Ok(self.tables.loans.get(id).cloned())
    }

    fn loans(&self) -> Result<Vec<LoanSlip>, StoreError> {
        Ok(self.tables.loans.values().cloned().collect())
    }

    fn insert_book(&mut self, book: Book) -> Result<(), StoreError> {
        insert_row(&mut self.tables.books, book.id.clone(), book)
    }

    fn insert_reader(&mut self, reader: Reader) -> Result<(), StoreError> {
        insert_row(&mut self.tables.readers, reader.id.clone(), reader)
    }

    fn insert_employee(&mut self, employee: Employee) -> Result<(), StoreError> {
        insert_row(&mut self.tables.employees, employee.id.clone(), employee)
    }

    fn insert_loan(&mut self, loan: LoanSlip) -> Result<(), StoreError> {
        insert_row(&mut self.tables.loans, loan.id.clone(), loan)
    }

    fn update_book(&mut self, book: Book) -> Result<(), StoreError> {
        match self.tables.books.get_mut(&book.id) {
            Some(row) => {
                *row = book;
                Ok(())
            }
            None => Err(StoreError::MissingRow { key: book.id }),
        }
    }

    fn update_loan(&mut self, loan: LoanSlip) -> Result<(), StoreError> {
        match self.tables.loans.get_mut(&loan.id) {
            Some(row) => {
                *row = loan;
                Ok(())
            }
            None => Err(StoreError::MissingRow { key: loan.id }),
        }
    }

    fn remove_loan(&mut self, id: &str) -> Result<(), StoreError> {
        match self.tables.loans.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::MissingRow { key: id.to_string() }),
        }
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.checkpoint = Some(self.tables.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.checkpoint.is_none() {
            return Err(StoreError::NoTransaction);
        }
        if self.poisoned_commits > 0 {
            self.poisoned_commits -= 1;
            return Err(StoreError::CommitFailed {
                message: "injected commit failure".to_string(),
            });
        }
        self.checkpoint = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.tables = checkpoint;
        }
        Ok(())
    }
}
