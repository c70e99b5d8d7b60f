pub mod search;
pub mod identity;
pub mod payment;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Payment sheet unavailable: {0}")]
    PaymentSheetError(String),
}
