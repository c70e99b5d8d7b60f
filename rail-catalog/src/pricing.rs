use serde::{Deserialize, Serialize};
use std::fmt;

/// Fare rules applied on top of the per-seat train fare
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FareRules {
    /// ISO-ish currency label shown next to amounts, e.g. "BDT"
    pub currency: String,

    /// Proportional tax on the subtotal (0.05 = 5%)
    #[serde(default)]
    pub tax_rate: f64,

    /// Flat fee per booking in minor units, reported as part of tax
    #[serde(default)]
    pub booking_fee: i64,
}

impl Default for FareRules {
    fn default() -> Self {
        Self {
            currency: "BDT".to_string(),
            tax_rate: 0.0,
            booking_fee: 5_000,
        }
    }
}

/// An amount in minor units with its currency label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub minor: i64,
    pub currency: String,
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let abs = self.minor.abs();
        write!(f, "{} {}{}.{:02}", self.currency, sign, abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareSummary {
    pub passenger_count: usize,
    pub unit_fare: Money,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

pub struct PricingEngine {
    rules: FareRules,
}

impl PricingEngine {
    pub fn new(rules: FareRules) -> Result<Self, PricingError> {
        if !rules.tax_rate.is_finite() || rules.tax_rate < 0.0 {
            return Err(PricingError::InvalidTaxRate(rules.tax_rate));
        }
        if rules.booking_fee < 0 {
            return Err(PricingError::NegativeAmount(rules.booking_fee));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &FareRules {
        &self.rules
    }

    /// Price a booking. A passenger stage entered without seats still carries
    /// one passenger, so the count is clamped to at least one.
    pub fn quote(
        &self,
        unit_fare: i64,
        passenger_count: usize,
    ) -> Result<FareSummary, PricingError> {
        if unit_fare < 0 {
            return Err(PricingError::NegativeAmount(unit_fare));
        }
        let count = passenger_count.max(1);
        let subtotal = unit_fare
            .checked_mul(count as i64)
            .ok_or(PricingError::Overflow)?;
        let proportional = (subtotal as f64 * self.rules.tax_rate).round() as i64;
        let tax = proportional
            .checked_add(self.rules.booking_fee)
            .ok_or(PricingError::Overflow)?;
        let total = subtotal.checked_add(tax).ok_or(PricingError::Overflow)?;

        Ok(FareSummary {
            passenger_count: count,
            unit_fare: self.money(unit_fare),
            subtotal: self.money(subtotal),
            tax: self.money(tax),
            total: self.money(total),
        })
    }

    fn money(&self, minor: i64) -> Money {
        Money {
            minor,
            currency: self.rules.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("Tax rate must be a non-negative number, got {0}")]
    InvalidTaxRate(f64),

    #[error("Amount must not be negative: {0}")]
    NegativeAmount(i64),

    #[error("Fare calculation overflowed")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_with_flat_fee() {
        let engine = PricingEngine::new(FareRules::default()).unwrap();

        let summary = engine.quote(44_500, 2).unwrap();
        assert_eq!(summary.subtotal.to_string(), "BDT 890.00");
        assert_eq!(summary.tax.to_string(), "BDT 50.00");
        assert_eq!(summary.total.to_string(), "BDT 940.00");
    }

    #[test]
    fn test_quote_with_tax_rate() {
        let engine = PricingEngine::new(FareRules {
            currency: "BDT".to_string(),
            tax_rate: 0.05,
            booking_fee: 0,
        })
        .unwrap();

        let summary = engine.quote(62_500, 3).unwrap();
        assert_eq!(summary.subtotal.minor, 187_500);
        assert_eq!(summary.tax.minor, 9_375);
        assert_eq!(summary.total.minor, 196_875);
    }

    #[test]
    fn test_zero_passengers_priced_as_one() {
        let engine = PricingEngine::new(FareRules::default()).unwrap();
        let summary = engine.quote(62_500, 0).unwrap();
        assert_eq!(summary.passenger_count, 1);
        assert_eq!(summary.subtotal.minor, 62_500);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(PricingEngine::new(FareRules { tax_rate: -0.1, ..FareRules::default() }).is_err());
        let rules = FareRules {
            tax_rate: f64::NAN,
            ..FareRules::default()
        };
        assert!(PricingEngine::new(rules).is_err());

        let engine = PricingEngine::new(FareRules::default()).unwrap();
        assert_eq!(engine.quote(-1, 1), Err(PricingError::NegativeAmount(-1)));
        assert_eq!(engine.quote(i64::MAX, 2), Err(PricingError::Overflow));
    }

    #[test]
    fn test_money_display() {
        let money = Money { minor: -1_205, currency: "BDT".to_string() };
        assert_eq!(money.to_string(), "BDT -12.05");
    }
}
