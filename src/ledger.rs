use std::collections::BTreeMap;

use crate::model::Book;
use crate::types::BookId;

/// staged book quantity mutations for one transaction
///
/// The ledger owns the quantity rules: checkout subtracts exactly one,
/// restock adds exactly one. It only marks books as changed; the coordinator
/// hands the staged rows to the store inside its transaction, so nothing
/// here commits.
///
/// There is deliberately no negative guard at this layer. The caller must
/// have verified `quantity > 0` before a checkout; a violated precondition
/// still proceeds and shows up as a negative quantity.
#[derive(Debug, Default)]
pub struct InventoryLedger {
    changed: BTreeMap<BookId, Book>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// stage a quantity decrement for a loaned book
    pub fn checkout(&mut self, book: &Book) {
        let row = self
            .changed
            .entry(book.id.clone())
            .or_insert_with(|| book.clone());
        row.quantity -= 1;
    }

    /// stage a quantity increment for a returned book
    pub fn restock(&mut self, book: &Book) {
        let row = self
            .changed
            .entry(book.id.clone())
            .or_insert_with(|| book.clone());
        row.quantity += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// the staged rows, ready for the store's persistence step
    pub fn into_changed(self) -> Vec<Book> {
        self.changed.into_values().collect()
    }
}
