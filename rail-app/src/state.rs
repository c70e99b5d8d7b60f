use crate::journal::EventJournal;
use crate::stages::StageError;
use rail_catalog::{PricingEngine, TrainCatalog};
use rail_core::identity::AccountProfile;
use rail_core::payment::PaymentSheet;
use rail_order::TicketIssuer;
use rail_store::Config;
use std::sync::Arc;

/// Everything the stages share for one session
pub struct AppState {
    pub catalog: TrainCatalog,
    pub pricing: PricingEngine,
    pub account: AccountProfile,
    pub sheet: Arc<dyn PaymentSheet>,
    pub issuer: TicketIssuer,
    pub journal: EventJournal,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, StageError> {
        Ok(Self {
            catalog: config.catalog(),
            pricing: config.pricing()?,
            account: config.account.clone(),
            sheet: Arc::new(config.payment.sheet()),
            issuer: TicketIssuer::new(config.pricing()?),
            journal: EventJournal::new(),
        })
    }

    /// Swap the payment sheet, e.g. for a scripted decline
    pub fn with_sheet(mut self, sheet: Arc<dyn PaymentSheet>) -> Self {
        self.sheet = sheet;
        self
    }
}
