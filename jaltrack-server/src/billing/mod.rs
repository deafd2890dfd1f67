//! Monthly billing engine
//!
//! Three cooperating parts:
//! - [`calendar`]: reconciles a customer's calendar against holiday
//!   ranges for a target month (pure)
//! - [`pricing`]: turns chargeable days + rate + manual adjustments
//!   into invoice amounts (pure, exact decimal arithmetic)
//! - [`generate`]: orchestrates both over all active customers of a
//!   business and upserts one invoice per (customer, period)

pub mod calendar;
pub mod generate;
pub mod money;
pub mod pricing;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Errors raised by the pure billing components
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Caller supplied an out-of-domain value (negative rate, negative
    /// day count, negative adjustment, unparsable amount)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Month outside 1-12, or the (month, year) pair does not name a
    /// real calendar month
    #[error("invalid billing period: {month}/{year}")]
    InvalidPeriod { month: u32, year: i32 },

    /// A date field could not be parsed as an ISO-8601 calendar date
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match &err {
            BillingError::InvalidPeriod { month, year } => {
                AppError::new(ErrorCode::InvalidBillingPeriod)
                    .with_detail("month", *month)
                    .with_detail("year", *year)
            }
            BillingError::InvalidInput(_) | BillingError::InvalidDate(_) => {
                AppError::validation(err.to_string())
            }
        }
    }
}
