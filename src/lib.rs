pub mod config;
pub mod decimal;
pub mod desk;
pub mod errors;
pub mod events;
pub mod identifier;
pub mod ledger;
pub mod model;
pub mod query;
pub mod store;
pub mod types;

// re-export key types
pub use config::LoanPolicy;
pub use decimal::Money;
pub use desk::{AuditEntry, CirculationDesk, LoanRequest, ReturnLine};
pub use errors::{CirculationError, Result, ValidationIssue};
pub use events::{Event, EventStore};
pub use identifier::next_loan_id;
pub use ledger::InventoryLedger;
pub use model::{Book, Employee, LoanDetail, LoanSlip, Reader};
pub use query::{LoanFilter, LoanLine, LoanRecord};
pub use store::{memory::MemoryStore, LoanStore, StoreError};
pub use types::{BookId, EmployeeId, LoanId, LoanStatus, ReaderId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
