//! Invoice amount calculation
//!
//! Pure decimal arithmetic: chargeable days times per-day rate, merged
//! with manual adjustments into the final payable amount. Inputs are
//! re-validated here even though the reconciler should never produce
//! out-of-domain values.

use super::BillingError;
use super::money::round_money;
use rust_decimal::Decimal;

/// Manual adjustment applied by an admin on top of the computed base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adjustment {
    pub discount: Decimal,
    pub additional_charges: Decimal,
}

/// Computed invoice amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceAmounts {
    pub base_amount: Decimal,
    pub discount: Decimal,
    pub additional_charges: Decimal,
    pub final_amount: Decimal,
}

/// Price one invoice: `base = chargeable_days * rate`, then
/// `final = max(0, base - discount + additional_charges)`.
///
/// An absent adjustment defaults to zero discount and charges.
pub fn price(
    chargeable_days: i64,
    rate_per_jug: Decimal,
    existing_adjustment: Option<&Adjustment>,
) -> Result<InvoiceAmounts, BillingError> {
    if chargeable_days < 0 {
        return Err(BillingError::InvalidInput(format!(
            "chargeable days must be non-negative, got {chargeable_days}"
        )));
    }
    if rate_per_jug.is_sign_negative() {
        return Err(BillingError::InvalidInput(format!(
            "rate must be non-negative, got {rate_per_jug}"
        )));
    }

    let adjustment = existing_adjustment.copied().unwrap_or_default();
    if adjustment.discount.is_sign_negative() {
        return Err(BillingError::InvalidInput(format!(
            "discount must be non-negative, got {}",
            adjustment.discount
        )));
    }
    if adjustment.additional_charges.is_sign_negative() {
        return Err(BillingError::InvalidInput(format!(
            "additional charges must be non-negative, got {}",
            adjustment.additional_charges
        )));
    }

    let base_amount = round_money(Decimal::from(chargeable_days) * rate_per_jug);
    let discount = round_money(adjustment.discount);
    let additional_charges = round_money(adjustment.additional_charges);

    Ok(InvoiceAmounts {
        base_amount,
        discount,
        additional_charges,
        final_amount: final_amount(base_amount, discount, additional_charges),
    })
}

/// `max(0, base - discount + additional)`, rounded to paise.
///
/// Also used by the manual adjustment path, which recomputes from the
/// stored base without re-running the reconciler.
pub fn final_amount(base: Decimal, discount: Decimal, additional_charges: Decimal) -> Decimal {
    round_money((base - discount + additional_charges).max(Decimal::ZERO))
}
