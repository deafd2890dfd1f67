//! Money helpers using rust_decimal for precision
//!
//! All amounts are carried as `Decimal` in memory and as exact decimal
//! text in storage. Rupee amounts round to 2 decimal places (paise),
//! half-up.

use super::BillingError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounding precision for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to paise precision
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a stored amount (decimal text) into a `Decimal`
pub fn parse_money(text: &str) -> Result<Decimal, BillingError> {
    text.trim()
        .parse::<Decimal>()
        .map_err(|_| BillingError::InvalidInput(format!("malformed amount '{text}'")))
}

/// Format an amount as canonical decimal text with 2 fractional digits
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_money(Decimal::new(5, 3)), Decimal::new(1, 2)); // 0.005 -> 0.01
        assert_eq!(round_money(Decimal::new(4, 3)), Decimal::ZERO); // 0.004 -> 0.00
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(format_money(Decimal::from(1400)), "1400.00");
        assert_eq!(format_money(Decimal::new(505, 1)), "50.50");
    }

    #[test]
    fn test_parse_roundtrip() {
        let d = parse_money("1250.00").unwrap();
        assert_eq!(d, Decimal::from(1250));
        assert_eq!(format_money(d), "1250.00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_money("fifty").is_err());
        assert!(parse_money("").is_err());
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times; f64 would drift
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += Decimal::new(1, 2);
        }
        assert_eq!(format_money(total), "10.00");
    }
}
