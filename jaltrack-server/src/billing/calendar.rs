//! Calendar reconciliation for a billing period
//!
//! Computes, for one customer and one (month, year), how many days are
//! chargeable after removing supplier-wide holidays and (when the
//! customer opted in) customer-specific holidays. Pure and
//! deterministic; all I/O stays in the orchestrator.

use super::BillingError;
use chrono::NaiveDate;
use serde::Serialize;

/// The customer fields the reconciler needs
#[derive(Debug, Clone)]
pub struct BillableCustomer {
    pub id: i64,
    /// First day the customer receives deliveries
    pub join_date: NaiveDate,
    /// Whether customer-specific holidays reduce this customer's bill
    pub holiday_billing: bool,
}

/// Whether a holiday applies business-wide or to specific customers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayScope {
    Supplier,
    Client,
}

/// An inclusive holiday date range
#[derive(Debug, Clone)]
pub struct HolidaySpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub scope: HolidayScope,
    /// For client-scoped spans: the targeted customer, or `None` for all
    pub customer_id: Option<i64>,
}

impl HolidaySpan {
    fn covers(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    fn applies_to(&self, customer_id: i64) -> bool {
        self.customer_id.is_none_or(|id| id == customer_id)
    }
}

/// Day counts for one (customer, month, year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayBreakdown {
    /// Billable calendar days: month length, reduced to the join date
    /// onward in the customer's joining month
    pub total_days: u32,
    pub supplier_holiday_days: u32,
    pub client_holiday_days: u32,
    pub chargeable_days: u32,
}

impl DayBreakdown {
    const ZERO: Self = Self {
        total_days: 0,
        supplier_holiday_days: 0,
        client_holiday_days: 0,
        chargeable_days: 0,
    };
}

/// First and last day of (month, year)
pub fn month_bounds(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), BillingError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or(BillingError::InvalidPeriod { month, year })?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .ok_or(BillingError::InvalidPeriod { month, year })?;
    Ok((start, end))
}

/// Reconcile one customer's calendar against the business's holidays
/// for the target month.
///
/// Holiday ranges are clipped to the month; days covered by more than
/// one range count once (day-set union, not sum of range lengths). A
/// day inside both a supplier and a client range counts as a supplier
/// holiday, so it is never subtracted twice. Client holiday days are
/// always reported but reduce `chargeable_days` only when the customer
/// opted into holiday billing.
pub fn reconcile(
    customer: &BillableCustomer,
    holidays: &[HolidaySpan],
    month: u32,
    year: i32,
) -> Result<DayBreakdown, BillingError> {
    let (month_start, month_end) = month_bounds(month, year)?;

    // Joined after this month ended: nothing to bill
    if customer.join_date > month_end {
        return Ok(DayBreakdown::ZERO);
    }

    let window_start = customer.join_date.max(month_start);
    let total_days = (month_end - window_start).num_days() as u32 + 1;

    // Holidays count over the whole month (clipped to its bounds);
    // chargeable_days floors at zero when they exceed the join window.
    let mut supplier_holiday_days = 0u32;
    let mut client_holiday_days = 0u32;
    for day in month_start.iter_days().take_while(|d| *d <= month_end) {
        if holidays
            .iter()
            .any(|h| h.scope == HolidayScope::Supplier && h.covers(day))
        {
            supplier_holiday_days += 1;
        } else if holidays.iter().any(|h| {
            h.scope == HolidayScope::Client && h.applies_to(customer.id) && h.covers(day)
        }) {
            client_holiday_days += 1;
        }
    }

    let deducted = if customer.holiday_billing {
        supplier_holiday_days + client_holiday_days
    } else {
        supplier_holiday_days
    };

    Ok(DayBreakdown {
        total_days,
        supplier_holiday_days,
        client_holiday_days,
        chargeable_days: total_days.saturating_sub(deducted),
    })
}
