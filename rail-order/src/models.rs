use chrono::{DateTime, Utc};
use rail_catalog::{SeatId, SeatSelection};
use rail_core::identity::AccountProfile;
use rail_core::payment::PaymentMethod;
use rail_core::search::TrainOption;
use rail_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PASSENGER_TYPE: &str = "Adult";

/// Passengers a booking is priced for: one per seat or per passenger entry,
/// whichever is larger, never fewer than one.
pub fn billable_passengers(passengers: usize, seats: usize) -> usize {
    passengers.max(seats).max(1)
}

fn default_passenger_type() -> String {
    DEFAULT_PASSENGER_TYPE.to_string()
}

/// One traveller, positionally aligned with the seat selection.
///
/// Serialized with the same keys the handoff payload has always used:
/// `{"name":"A","type":"Adult","seat":"C1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default = "default_passenger_type")]
    pub passenger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatId>,
}

impl Passenger {
    pub fn new(name: impl Into<String>, seat: Option<SeatId>) -> Self {
        Self {
            name: name.into(),
            passenger_type: default_passenger_type(),
            seat,
        }
    }
}

/// Partial edit of a passenger; the seat is never editable here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassengerPatch {
    pub name: Option<String>,
    pub passenger_type: Option<String>,
}

impl PassengerPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn passenger_type(passenger_type: impl Into<String>) -> Self {
        Self {
            passenger_type: Some(passenger_type.into()),
            ..Self::default()
        }
    }

    pub fn apply(&self, passenger: &mut Passenger) {
        if let Some(name) = &self.name {
            passenger.name = name.clone();
        }
        if let Some(passenger_type) = &self.passenger_type {
            passenger.passenger_type = passenger_type.clone();
        }
    }
}

/// Free-text contact block. No format validation happens in the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub id_type: String,
    pub id_number: Masked<String>,
}

impl ContactInfo {
    pub fn from_profile(profile: &AccountProfile) -> Self {
        Self {
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            id_type: profile.id_type.clone(),
            id_number: profile.id_number.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStage {
    SeatSelection,
    PassengerDetails,
    BookingDetails,
    Ticket,
}

impl BookingStage {
    pub fn next(self) -> Option<BookingStage> {
        match self {
            BookingStage::SeatSelection => Some(BookingStage::PassengerDetails),
            BookingStage::PassengerDetails => Some(BookingStage::BookingDetails),
            BookingStage::BookingDetails => Some(BookingStage::Ticket),
            BookingStage::Ticket => None,
        }
    }
}

/// Everything carried from the seat map to the ticket.
///
/// Each stage consumes the record and hands back an extended one; once the
/// record reaches `Ticket` it is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: Uuid,
    pub trip: Option<TrainOption>,
    pub selected_seats: SeatSelection,
    pub passengers: Vec<Passenger>,
    pub contact: Option<ContactInfo>,
    pub payment_method: Option<PaymentMethod>,
    pub stage: BookingStage,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRecord {
    pub fn new(trip: Option<TrainOption>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trip,
            selected_seats: SeatSelection::new(),
            passengers: Vec::new(),
            contact: None,
            payment_method: None,
            stage: BookingStage::SeatSelection,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn passenger_count(&self) -> usize {
        billable_passengers(self.passengers.len(), self.selected_seats.len())
    }

    pub fn is_terminal(&self) -> bool {
        self.stage == BookingStage::Ticket
    }

    /// Seat Selection → Passenger Details. Going back and reselecting is
    /// allowed from any non-terminal stage.
    pub fn confirm_seats(mut self, seats: SeatSelection) -> Result<Self, BookingError> {
        self.ensure_mutable(BookingStage::PassengerDetails)?;
        self.selected_seats = seats;
        self.move_to(BookingStage::PassengerDetails);
        Ok(self)
    }

    /// Passenger Details → Booking Details
    pub fn confirm_passengers(mut self, passengers: Vec<Passenger>) -> Result<Self, BookingError> {
        self.ensure_mutable(BookingStage::BookingDetails)?;
        if self.stage < BookingStage::PassengerDetails {
            return Err(BookingError::InvalidTransition {
                from: self.stage,
                to: BookingStage::BookingDetails,
            });
        }
        self.passengers = passengers;
        self.move_to(BookingStage::BookingDetails);
        Ok(self)
    }

    /// Booking Details → Ticket, after the submission gate lets it through
    pub fn confirm_payment(
        mut self,
        contact: ContactInfo,
        payment_method: PaymentMethod,
    ) -> Result<Self, BookingError> {
        if self.stage != BookingStage::BookingDetails {
            return Err(BookingError::InvalidTransition {
                from: self.stage,
                to: BookingStage::Ticket,
            });
        }
        self.contact = Some(contact);
        self.payment_method = Some(payment_method);
        self.move_to(BookingStage::Ticket);
        Ok(self)
    }

    fn ensure_mutable(&self, to: BookingStage) -> Result<(), BookingError> {
        if self.is_terminal() {
            return Err(BookingError::InvalidTransition { from: self.stage, to });
        }
        Ok(())
    }

    fn move_to(&mut self, stage: BookingStage) {
        tracing::info!("Booking {} moved {:?} -> {:?}", self.id, self.stage, stage);
        self.stage = stage;
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid stage transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStage,
        to: BookingStage,
    },
}
