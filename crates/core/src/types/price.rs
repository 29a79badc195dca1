//! Type-safe price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display, e.g. `R$ 1.234,50` or `$1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let fixed = format!("{:.2}", self.amount.round_dp(2).abs());
        let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
        let (group_sep, decimal_sep) = self.currency_code.separators();

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(digit);
        }

        let sign = if self.amount.is_sign_negative() && !self.amount.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{sign}{}{grouped}{decimal_sep}{cents}",
            self.currency_code.symbol()
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Currency symbol including any trailing space.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Thousands and decimal separators used when formatting.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL => ('.', ','),
            Self::USD | Self::EUR | Self::GBP => (',', '.'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_brl() {
        let price = Price::new(Decimal::new(17990, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 179,90");

        let price = Price::new(Decimal::new(123_450, 2), CurrencyCode::BRL);
        assert_eq!(price.display(), "R$ 1.234,50");
    }

    #[test]
    fn test_display_usd_grouping() {
        let price = Price::new(Decimal::new(12_345_678, 1), CurrencyCode::USD);
        assert_eq!(price.display(), "$1,234,567.80");
    }

    #[test]
    fn test_display_rounds_to_cents() {
        let price = Price::new(Decimal::new(19_999, 3), CurrencyCode::USD);
        assert_eq!(price.display(), "$20.00");
    }

    #[test]
    fn test_display_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO, CurrencyCode::BRL).display(), "R$ 0,00");
        assert_eq!(
            Price::new(Decimal::new(-550, 2), CurrencyCode::USD).display(),
            "-$5.50"
        );
    }
}
