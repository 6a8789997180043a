use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{BookId, EmployeeId, LoanId, ReaderId};

/// all events emitted by the circulation desk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // loan lifecycle
    LoanCreated {
        loan_id: LoanId,
        reader_id: ReaderId,
        employee_id: EmployeeId,
        book_count: usize,
        reference: String,
        timestamp: DateTime<Utc>,
    },
    LoanReturned {
        loan_id: LoanId,
        reader_id: ReaderId,
        timestamp: DateTime<Utc>,
    },
    LoanDeleted {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },

    // inventory movements
    BookCheckedOut {
        loan_id: LoanId,
        book_id: BookId,
        remaining: i64,
        timestamp: DateTime<Utc>,
    },
    BookRestocked {
        loan_id: LoanId,
        book_id: BookId,
        quantity: i64,
        timestamp: DateTime<Utc>,
    },
    /// a lost book stays out of circulating stock
    BookWrittenOff {
        loan_id: LoanId,
        book_id: BookId,
        fine: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
