use serde::{Deserialize, Serialize};

use crate::errors::{CirculationError, Result};

/// circulation policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanPolicy {
    /// prefix for generated loan identifiers
    pub id_prefix: String,
    /// zero-padding width of the numeric part
    pub id_width: usize,
    /// default borrowing window, loan date to due date
    pub loan_period_days: i64,
    /// condition recorded on every detail line at checkout
    pub default_condition: String,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            id_prefix: "PM".to_string(),
            id_width: 3,
            loan_period_days: 14,
            default_condition: "Good".to_string(),
        }
    }
}

impl LoanPolicy {
    /// the stock policy: `PM###` identifiers, 14-day loans
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.id_prefix.trim().is_empty() {
            return Err(CirculationError::InvalidPolicy {
                message: "identifier prefix must not be blank".to_string(),
            });
        }
        if self.id_width == 0 {
            return Err(CirculationError::InvalidPolicy {
                message: "identifier width must be at least 1".to_string(),
            });
        }
        if self.loan_period_days < 1 {
            return Err(CirculationError::InvalidPolicy {
                message: "loan period must be at least one day".to_string(),
            });
        }
        if self.default_condition.trim().is_empty() {
            return Err(CirculationError::InvalidPolicy {
                message: "default condition must not be blank".to_string(),
            });
        }
        Ok(())
    }
}
