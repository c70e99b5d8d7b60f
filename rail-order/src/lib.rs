pub mod models;
pub mod roster;
pub mod checkout;
pub mod transfer;
pub mod fulfillment;

pub use models::{BookingError, BookingRecord, BookingStage, ContactInfo, Passenger, PassengerPatch};
pub use roster::PassengerRoster;
pub use checkout::{CheckoutError, CheckoutGate, GateDecision, PaymentFailure, Submission};
pub use transfer::{HandoffParams, TransferError};
pub use fulfillment::{Barcode, FulfillmentError, Ticket, TicketIssuer, TicketStatus};
