use uuid::Uuid;

/// The user confirmed a non-empty seat selection and left the seat map.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct SeatsConfirmedEvent {
    pub booking_id: Uuid,
    pub train_id: Option<String>,
    pub seats: Vec<String>,
    pub timestamp: i64,
}

/// The payment sheet reported a failure; the booking stays where it was.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct PaymentRejectedEvent {
    pub booking_id: Uuid,
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct TicketIssuedEvent {
    pub booking_id: Uuid,
    pub ticket_id: Uuid,
    pub barcode: String,
    pub passenger_count: usize,
    pub total_minor: i64,
    pub currency: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEvent {
    SeatsConfirmed(SeatsConfirmedEvent),
    PaymentRejected(PaymentRejectedEvent),
    TicketIssued(TicketIssuedEvent),
}

impl BookingEvent {
    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingEvent::SeatsConfirmed(e) => e.booking_id,
            BookingEvent::PaymentRejected(e) => e.booking_id,
            BookingEvent::TicketIssued(e) => e.booking_id,
        }
    }
}
