use crate::models::{billable_passengers, Passenger};
use crate::transfer::{self, HandoffParams};
use chrono::{DateTime, Utc};
use rail_catalog::{FareSummary, PricingEngine, PricingError, SeatSelection};
use rail_core::search::TrainOption;
use rail_shared::Masked;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Shown wherever a handed-over field is missing
pub const PLACEHOLDER: &str = "—";

const BARCODE_DIGITS: u32 = 11;
const LEFT_GUARD: [Bar; 3] = [
    Bar { width: 2, gap: 2 },
    Bar { width: 2, gap: 1 },
    Bar { width: 1, gap: 2 },
];
const RIGHT_GUARD: [Bar; 2] = [Bar { width: 2, gap: 2 }, Bar { width: 2, gap: 0 }];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub width: u8,
    pub gap: u8,
}

/// Decorative barcode. Looks the part, is not scannable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Barcode {
    pub value: String,
    pub bars: Vec<Bar>,
}

impl Barcode {
    pub fn for_ticket(ticket_id: &Uuid) -> Self {
        let value = format!(
            "{:0width$}",
            ticket_id.as_u128() % 10u128.pow(BARCODE_DIGITS),
            width = BARCODE_DIGITS as usize
        );

        let mut bars = LEFT_GUARD.to_vec();
        for digit in value.bytes().map(|b| b - b'0') {
            bars.push(Bar { width: 1 + digit % 4, gap: 1 + digit / 5 });
            bars.push(Bar { width: 1 + (digit * 7) % 3, gap: 1 });
        }
        bars.extend_from_slice(&RIGHT_GUARD);

        Self { value, bars }
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bar in &self.bars {
            write!(f, "{}{}", "█".repeat(bar.width as usize), " ".repeat(bar.gap as usize))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Ongoing,
    Completed,
    Cancelled,
}

/// Read-only ticket assembled from the final handoff
#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub issued_at: DateTime<Utc>,
    pub train: Option<TrainOption>,
    pub seats: SeatSelection,
    pub passengers: Vec<Passenger>,
    pub email: String,
    pub phone: String,
    pub id_type: String,
    pub id_number: Masked<String>,
    pub payment: String,
    pub fare: Option<FareSummary>,
    pub barcode: Barcode,
    pub status: TicketStatus,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.train {
            Some(train) => {
                writeln!(f, "{} | {} | {}", train.name, train.seat_class, self.seats.summary())?;
                writeln!(
                    f,
                    "{} {} -> {} {} ({}) on {}",
                    train.from,
                    train.departure.format("%I:%M %p"),
                    train.to,
                    train.arrival.format("%I:%M %p"),
                    train.duration_label(),
                    train.date.format("%d %b, %Y")
                )?;
            }
            None => writeln!(f, "{} | {}", PLACEHOLDER, self.seats.summary())?,
        }

        writeln!(f, "Passengers")?;
        if self.passengers.is_empty() {
            writeln!(f, "  {}", PLACEHOLDER)?;
        }
        for (i, p) in self.passengers.iter().enumerate() {
            let seat = p
                .seat
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            let name = if p.name.is_empty() { PLACEHOLDER } else { p.name.as_str() };
            writeln!(f, "  {:02} {} ({}) seat {}", i + 1, name, p.passenger_type, seat)?;
        }

        writeln!(f, "Email     {}", self.email)?;
        writeln!(f, "Phone     {}", self.phone)?;
        writeln!(f, "ID        {} {}", self.id_type, self.id_number.expose())?;
        writeln!(f, "Payment   {}", self.payment)?;
        match &self.fare {
            Some(fare) => {
                writeln!(f, "Subtotal  {}", fare.subtotal)?;
                writeln!(f, "Tax       {}", fare.tax)?;
                writeln!(f, "Total     {}", fare.total)?;
            }
            None => writeln!(f, "Total     {}", PLACEHOLDER)?,
        }
        writeln!(f, "{}", self.barcode)?;
        write!(f, "{}", self.barcode.value)
    }
}

/// Issues tickets from the final handoff and keeps the ones it issued
pub struct TicketIssuer {
    pricing: PricingEngine,
    tickets: HashMap<Uuid, Ticket>,
}

impl TicketIssuer {
    pub fn new(pricing: PricingEngine) -> Self {
        Self {
            pricing,
            tickets: HashMap::new(),
        }
    }

    /// Decode the handoff and assemble the ticket. Malformed seats or
    /// passengers come through as empty lists; missing contact fields as
    /// the placeholder.
    pub fn issue(
        &mut self,
        params: &HandoffParams,
        train: Option<&TrainOption>,
    ) -> Result<Ticket, FulfillmentError> {
        let seats = params.seats();
        let passengers = params.passengers();

        let fare = match train {
            Some(t) => Some(
                self.pricing
                    .quote(t.unit_fare, billable_passengers(passengers.len(), seats.len()))?,
            ),
            None => None,
        };

        let id = Uuid::new_v4();
        let field = |key: &str| params.get(key).unwrap_or(PLACEHOLDER).to_string();

        let ticket = Ticket {
            id,
            booking_id: params.booking_id(),
            issued_at: Utc::now(),
            train: train.cloned(),
            email: field(transfer::EMAIL),
            phone: field(transfer::PHONE),
            id_type: field(transfer::ID_TYPE),
            id_number: field(transfer::ID_NUMBER).into(),
            payment: field(transfer::PAYMENT),
            seats,
            passengers,
            fare,
            barcode: Barcode::for_ticket(&id),
            status: TicketStatus::Ongoing,
        };

        tracing::info!(
            "Issued ticket {} ({} passengers, barcode {})",
            ticket.id,
            ticket.passengers.len(),
            ticket.barcode.value
        );
        self.tickets.insert(ticket.id, ticket.clone());
        Ok(ticket)
    }

    pub fn get(&self, ticket_id: &Uuid) -> Option<&Ticket> {
        self.tickets.get(ticket_id)
    }

    pub fn get_by_barcode(&self, barcode: &str) -> Option<&Ticket> {
        self.tickets.values().find(|t| t.barcode.value == barcode)
    }

    /// Tickets in one tab of the "My Ticket" list, newest first
    pub fn with_status(&self, status: TicketStatus) -> Vec<&Ticket> {
        let mut tickets: Vec<&Ticket> = self
            .tickets
            .values()
            .filter(|t| t.status == status)
            .collect();
        tickets.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        tickets
    }

    /// Journey taken; the ticket moves to the completed tab
    pub fn complete(&mut self, barcode: &str) -> Result<(), FulfillmentError> {
        self.transition(barcode, TicketStatus::Completed)
    }

    pub fn cancel(&mut self, barcode: &str) -> Result<(), FulfillmentError> {
        self.transition(barcode, TicketStatus::Cancelled)
    }

    fn transition(&mut self, barcode: &str, to: TicketStatus) -> Result<(), FulfillmentError> {
        let ticket = self
            .tickets
            .values_mut()
            .find(|t| t.barcode.value == barcode)
            .ok_or_else(|| FulfillmentError::NotFound(barcode.to_string()))?;

        if ticket.status != TicketStatus::Ongoing {
            return Err(FulfillmentError::AlreadyClosed {
                barcode: barcode.to_string(),
                status: ticket.status,
            });
        }

        ticket.status = to;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FulfillmentError {
    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Ticket {barcode} is already {status:?}")]
    AlreadyClosed {
        barcode: String,
        status: TicketStatus,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
