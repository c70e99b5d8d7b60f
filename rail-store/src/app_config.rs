use rail_catalog::{FareRules, PricingEngine, PricingError, SeatLayout, TrainCatalog, TrainListing};
use rail_core::identity::AccountProfile;
use rail_core::payment::MockPaymentSheet;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub seat_map: SeatLayout,
    pub account: AccountProfile,
    pub fares: FareRules,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub trains: Vec<TrainListing>,
}

/// Behavior of the stub payment sheet
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PaymentConfig {
    #[serde(default)]
    pub latency_ms: u64,
    pub decline_code: Option<String>,
    pub decline_message: Option<String>,
    #[serde(default)]
    pub unavailable: bool,
}

impl PaymentConfig {
    pub fn sheet(&self) -> MockPaymentSheet {
        let sheet = if self.unavailable {
            MockPaymentSheet::unavailable()
        } else if let Some(code) = &self.decline_code {
            let message = self
                .decline_message
                .clone()
                .unwrap_or_else(|| "Your card was declined".to_string());
            MockPaymentSheet::declining(code.clone(), message)
        } else {
            MockPaymentSheet::approving()
        };
        sheet.with_latency(Duration::from_millis(self.latency_ms))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `RAIL__FARES__TAX_RATE=0.05`
            .add_source(config::Environment::with_prefix("RAIL").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        tracing::info!(
            "Loaded {} configuration with {} trains",
            run_mode,
            config.trains.len()
        );
        Ok(config)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn catalog(&self) -> TrainCatalog {
        TrainCatalog::new(self.trains.clone(), self.seat_map.clone())
    }

    pub fn pricing(&self) -> Result<PricingEngine, PricingError> {
        PricingEngine::new(self.fares.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_core::search::SearchQuery;

    const SAMPLE: &str = r#"
        [seat_map]
        rows = ["A", "B", "C"]
        left_columns = [1, 2]
        right_columns = [3, 4, 5]

        [account]
        full_name = "Ranjan Rawat"
        email = "ranjanrawat@gmail.com"
        phone = "+880 1925384071"
        id_type = "Passport"
        id_number = "713254896"

        [fares]
        currency = "BDT"
        tax_rate = 0.0
        booking_fee = 5000

        [payment]
        decline_code = "card_declined"

        [[trains]]
        id = "1"
        name = "Sundarban Express"
        from = "GAY"
        to = "DEL"
        departure = "08:00:00"
        arrival = "15:45:00"
        date = "2025-09-11"
        unit_fare = 62500
        booked_seats = ["A3", "B2"]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.seat_map.rows.len(), 3);
        assert_eq!(config.account.id_number.expose(), "713254896");
        assert_eq!(config.fares.booking_fee, 5000);
        assert_eq!(config.trains[0].booked_seats.len(), 2);

        let catalog = config.catalog();
        assert_eq!(catalog.search(&SearchQuery::default()).len(), 1);
        assert_eq!(catalog.seat_map("1").unwrap().available_count(), 15 - 2);
    }

    #[test]
    fn test_payment_section_is_optional() {
        let without_payment: String = SAMPLE
            .lines()
            .filter(|l| !l.contains("[payment]") && !l.contains("decline_code"))
            .collect::<Vec<_>>()
            .join("\n");
        let config = Config::from_toml_str(&without_payment).unwrap();
        assert!(config.payment.decline_code.is_none());
        assert!(!config.payment.unavailable);
    }

    #[test]
    fn test_missing_account_is_an_error() {
        let broken = SAMPLE.replace("[account]", "[not_account]");
        assert!(Config::from_toml_str(&broken).is_err());
    }
}
