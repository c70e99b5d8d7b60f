use crate::CoreError;
use async_trait::async_trait;
use rail_shared::Masked;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    Credit,
    Debit,
}

/// Card sub-fields as typed by the user. Nothing here is validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub card_type: CardType,
    pub number: Masked<String>,
    pub name: String,
    pub expiry: String,
    pub cvv: Masked<String>,
}

impl CardDetails {
    pub fn new(card_type: CardType) -> Self {
        Self {
            card_type,
            number: Masked(String::new()),
            name: String::new(),
            expiry: String::new(),
            cvv: Masked(String::new()),
        }
    }
}

/// Exclusive payment choice on the booking details stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Upi { vpa: String },
    Card(CardDetails),
    Emi { bank: Option<String>, tenure_months: Option<u8> },
}

impl PaymentMethod {
    /// Short label used in transfer params and on the ticket
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Upi { .. } => "UPI",
            PaymentMethod::Card(_) => "Card",
            PaymentMethod::Emi { .. } => "EMI",
        }
    }

    /// Only card payments go through the payment sheet.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, PaymentMethod::Card(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub card_type: CardType,
}

/// Wire shape reported by the payment sheet: `{ "success": true }` or
/// `{ "success": false, "code": "...", "message": "..." }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentSheetResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded,
    Failed { code: String, message: String },
}

impl From<PaymentSheetResponse> for PaymentOutcome {
    fn from(response: PaymentSheetResponse) -> Self {
        if response.success {
            return PaymentOutcome::Succeeded;
        }
        PaymentOutcome::Failed {
            code: response.code.unwrap_or_else(|| "UNKNOWN".to_string()),
            message: response.message.unwrap_or_else(|| "Payment failed".to_string()),
        }
    }
}

#[async_trait]
pub trait PaymentSheet: Send + Sync {
    /// Present the sheet and wait for the user to finish with it
    async fn present(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSheetResponse, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone)]
enum MockBehavior {
    Approve,
    Decline { code: String, message: String },
    Unavailable,
}

/// Stub sheet that never talks to a real provider
#[derive(Debug, Clone)]
pub struct MockPaymentSheet {
    behavior: MockBehavior,
    latency: Duration,
}

impl MockPaymentSheet {
    pub fn approving() -> Self {
        Self {
            behavior: MockBehavior::Approve,
            latency: Duration::ZERO,
        }
    }

    pub fn declining(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Decline {
                code: code.into(),
                message: message.into(),
            },
            latency: Duration::ZERO,
        }
    }

    /// Sheet that errors out before producing any response
    pub fn unavailable() -> Self {
        Self {
            behavior: MockBehavior::Unavailable,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl PaymentSheet for MockPaymentSheet {
    async fn present(
        &self,
        request: &PaymentRequest,
    ) -> Result<PaymentSheetResponse, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "Presenting mock payment sheet for booking {} ({} {})",
            request.booking_id,
            request.amount_minor,
            request.currency
        );

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &self.behavior {
            MockBehavior::Approve => Ok(PaymentSheetResponse {
                success: true,
                code: None,
                message: None,
            }),
            MockBehavior::Decline { code, message } => Ok(PaymentSheetResponse {
                success: false,
                code: Some(code.clone()),
                message: Some(message.clone()),
            }),
            MockBehavior::Unavailable => Err(Box::new(CoreError::PaymentSheetError(
                "simulated outage".to_string(),
            ))),
        }
    }
}
