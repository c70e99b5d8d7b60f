use crate::models::{BookingError, BookingRecord, BookingStage, ContactInfo};
use rail_catalog::Money;
use rail_core::payment::{PaymentMethod, PaymentOutcome, PaymentRequest, PaymentSheet};
use uuid::Uuid;

pub const GATEWAY_ERROR: &str = "GATEWAY_ERROR";
pub const MISSING_CONFIRMATION: &str = "MISSING_CONFIRMATION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFailure {
    pub code: String,
    pub message: String,
}

/// A "Pay Now" press. Only the most recent one can still be resolved.
#[derive(Debug, Clone)]
pub struct Submission {
    generation: u64,
    booking_id: Uuid,
    method: PaymentMethod,
}

impl Submission {
    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn booking_id(&self) -> Uuid {
        self.booking_id
    }
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    /// Record moved to the ticket stage
    Advance(Box<BookingRecord>),
    /// Payment failed; the record stays put and the user can retry
    Rejected(PaymentFailure),
    /// The user already left this stage; the late result was dropped
    Discarded,
}

/// Booking details stage: contact + payment method, and the rule for
/// whether the record may move on to the ticket.
#[derive(Debug, Clone)]
pub struct CheckoutGate {
    record: BookingRecord,
    contact: ContactInfo,
    payment_method: Option<PaymentMethod>,
    generation: u64,
    in_flight: Option<u64>,
    last_failure: Option<PaymentFailure>,
    completed: bool,
}

impl CheckoutGate {
    /// `defaults` pre-fill the contact form unless the record already has one.
    pub fn new(record: BookingRecord, defaults: ContactInfo) -> Result<Self, CheckoutError> {
        if record.stage != BookingStage::BookingDetails {
            return Err(CheckoutError::WrongStage(record.stage));
        }
        let contact = record.contact.clone().unwrap_or(defaults);
        let payment_method = record.payment_method.clone();
        Ok(Self {
            record,
            contact,
            payment_method,
            generation: 0,
            in_flight: None,
            last_failure: None,
            completed: false,
        })
    }

    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.contact.email = email.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.contact.phone = phone.into();
    }

    pub fn set_id_type(&mut self, id_type: impl Into<String>) {
        self.contact.id_type = id_type.into();
    }

    pub fn set_id_number(&mut self, id_number: impl Into<String>) {
        self.contact.id_number = id_number.into().into();
    }

    pub fn payment_method(&self) -> Option<&PaymentMethod> {
        self.payment_method.as_ref()
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        tracing::debug!("Payment method set to {}", method.label());
        self.payment_method = Some(method);
    }

    /// Failure from the last rejected attempt, for display
    pub fn last_failure(&self) -> Option<&PaymentFailure> {
        self.last_failure.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a submission. The caller confirms card payments with the sheet
    /// and then calls [`CheckoutGate::resolve`].
    pub fn begin_submission(&mut self) -> Result<Submission, CheckoutError> {
        if self.completed {
            return Err(CheckoutError::AlreadyCompleted);
        }
        if self.in_flight.is_some() {
            return Err(CheckoutError::SubmissionInFlight);
        }
        let method = self
            .payment_method
            .clone()
            .ok_or(CheckoutError::MissingPaymentMethod)?;

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.last_failure = None;

        Ok(Submission {
            generation: self.generation,
            booking_id: self.record.id,
            method,
        })
    }

    /// The user navigated away. Anything still pending is dropped when it lands.
    pub fn abandon(&mut self) {
        if self.in_flight.take().is_some() {
            tracing::info!("Booking {} left with a payment pending", self.record.id);
        }
        self.generation += 1;
    }

    /// Apply the payment result. UPI and EMI go through without one.
    pub fn resolve(
        &mut self,
        submission: Submission,
        outcome: Option<PaymentOutcome>,
    ) -> GateDecision {
        if self.in_flight != Some(submission.generation) {
            tracing::warn!(
                "Discarding stale payment result for booking {} (attempt {})",
                submission.booking_id,
                submission.generation
            );
            return GateDecision::Discarded;
        }
        self.in_flight = None;

        if submission.method.requires_confirmation() {
            match outcome {
                Some(PaymentOutcome::Succeeded) => {}
                Some(PaymentOutcome::Failed { code, message }) => {
                    return self.reject(code, message);
                }
                None => {
                    return self.reject(
                        MISSING_CONFIRMATION.to_string(),
                        "Card payment was not confirmed".to_string(),
                    );
                }
            }
        }

        match self
            .record
            .clone()
            .confirm_payment(self.contact.clone(), submission.method)
        {
            Ok(record) => {
                self.completed = true;
                GateDecision::Advance(Box::new(record))
            }
            // Constructor guarantees BookingDetails, so this is unreachable in practice
            Err(BookingError::InvalidTransition { from, .. }) => self.reject(
                "INVALID_STAGE".to_string(),
                format!("Booking cannot be paid from {:?}", from),
            ),
        }
    }

    /// Full "Pay Now": begin, confirm card payments with the sheet, resolve.
    pub async fn submit(
        &mut self,
        sheet: &dyn PaymentSheet,
        total: &Money,
    ) -> Result<GateDecision, CheckoutError> {
        let submission = self.begin_submission()?;

        let outcome = match submission.method() {
            PaymentMethod::Card(card) => {
                let request = PaymentRequest {
                    booking_id: submission.booking_id(),
                    amount_minor: total.minor,
                    currency: total.currency.clone(),
                    card_type: card.card_type,
                };
                let outcome = match sheet.present(&request).await {
                    Ok(response) => PaymentOutcome::from(response),
                    Err(e) => PaymentOutcome::Failed {
                        code: GATEWAY_ERROR.to_string(),
                        message: e.to_string(),
                    },
                };
                Some(outcome)
            }
            _ => None,
        };

        Ok(self.resolve(submission, outcome))
    }

    fn reject(&mut self, code: String, message: String) -> GateDecision {
        tracing::warn!("Payment rejected for booking {}: {} {}", self.record.id, code, message);
        let failure = PaymentFailure { code, message };
        self.last_failure = Some(failure.clone());
        GateDecision::Rejected(failure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Checkout needs a record at the booking details stage, got {0:?}")]
    WrongStage(BookingStage),

    #[error("Choose a payment method first")]
    MissingPaymentMethod,

    #[error("A payment is already being confirmed")]
    SubmissionInFlight,

    #[error("Booking already paid")]
    AlreadyCompleted,
}
