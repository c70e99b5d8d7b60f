//! The four booking screens, minus the rendering.
//!
//! Stages only talk to each other through [`HandoffParams`]: each one is
//! rebuilt from string parameters on entry and hands new parameters on when
//! the user continues.

use crate::journal::EventJournal;
use crate::state::AppState;
use chrono::Utc;
use rail_catalog::{
    CatalogError, FareSummary, Money, PricingEngine, PricingError, SeatId, SeatMap, SeatMapError,
    SeatState, TrainCatalog,
};
use rail_core::payment::{PaymentMethod, PaymentSheet};
use rail_core::search::TrainOption;
use rail_order::{
    BookingError, BookingRecord, BookingStage, CheckoutError, CheckoutGate, ContactInfo,
    FulfillmentError, GateDecision, HandoffParams, Passenger, PassengerPatch, PassengerRoster,
    PaymentFailure, Ticket, TransferError,
};
use rail_shared::models::events::{
    BookingEvent, PaymentRejectedEvent, SeatsConfirmedEvent, TicketIssuedEvent,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Look up the train named in the parameters. A missing or unknown id is not
/// fatal; the stage simply has no trip to show.
fn resolve_trip(params: &HandoffParams, catalog: &TrainCatalog) -> Option<TrainOption> {
    let train_id = params.train_id()?;
    match catalog.get(train_id) {
        Ok(listing) => Some(listing.train.clone()),
        Err(e) => {
            warn!("Handoff names a train we don't know: {}", e);
            None
        }
    }
}

pub struct SeatSelectionStage {
    record: BookingRecord,
    seat_map: SeatMap,
}

impl SeatSelectionStage {
    pub fn open(catalog: &TrainCatalog, train_id: &str) -> Result<Self, StageError> {
        let listing = catalog.get(train_id)?;
        let seat_map = catalog.seat_map(train_id)?;
        info!(
            "Opened seat map for {} ({} seats free)",
            listing.train.name,
            seat_map.available_count()
        );
        Ok(Self {
            record: BookingRecord::new(Some(listing.train.clone())),
            seat_map,
        })
    }

    /// Back from the passenger form. The booking and its passengers come
    /// along, and the earlier seats start out selected.
    pub fn reopen(params: HandoffParams, catalog: &TrainCatalog) -> Result<Self, StageError> {
        let train_id = params.train_id().ok_or(StageError::MissingTrain)?.to_string();
        let listing = catalog.get(&train_id)?;
        let mut seat_map = catalog.seat_map(&train_id)?;
        let record = params.into_record(Some(listing.train.clone()), BookingStage::SeatSelection);

        for seat in record.selected_seats.iter() {
            match seat_map.toggle(seat) {
                Ok(SeatState::Selected) => {}
                Ok(state) => warn!("Previously chosen seat {} is now {:?}", seat, state),
                Err(e) => warn!("Dropping previously chosen seat: {}", e),
            }
        }
        info!(
            "Reopened seat map for booking {} with {} seats held",
            record.id,
            seat_map.selected_count()
        );

        Ok(Self { record, seat_map })
    }

    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn seat_map(&self) -> &SeatMap {
        &self.seat_map
    }

    /// A tap on a seat. Taps on seats outside the layout are logged and
    /// otherwise ignored.
    pub fn tap(&mut self, seat: &SeatId) -> Option<SeatState> {
        match self.seat_map.toggle(seat) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Ignoring tap: {}", e);
                None
            }
        }
    }

    /// "Continue" on the seat map
    pub fn confirm(self, journal: &mut EventJournal) -> Result<HandoffParams, StageError> {
        let seats = self.seat_map.confirm_selection()?;
        let record = self.record.confirm_seats(seats)?;

        journal.record(BookingEvent::SeatsConfirmed(SeatsConfirmedEvent {
            booking_id: record.id,
            train_id: record.trip.as_ref().map(|t| t.id.clone()),
            seats: record.selected_seats.iter().map(ToString::to_string).collect(),
            timestamp: Utc::now().timestamp(),
        }));

        Ok(HandoffParams::from_record(&record)?)
    }
}

pub struct PassengerDetailsStage {
    record: BookingRecord,
    roster: PassengerRoster,
}

impl PassengerDetailsStage {
    /// Enter from the seat map, or come back from booking details with the
    /// passengers entered so far.
    pub fn from_params(params: HandoffParams, state: &AppState) -> Self {
        let trip = resolve_trip(&params, &state.catalog);
        let record = params.into_record(trip, BookingStage::PassengerDetails);

        let mut roster = PassengerRoster::with_passengers(
            state.account.default_passenger_name(),
            record.passengers.clone(),
        );
        roster.sync(&record.selected_seats);

        Self { record, roster }
    }

    pub fn record(&self) -> &BookingRecord {
        &self.record
    }

    pub fn passengers(&self) -> &[Passenger] {
        self.roster.passengers()
    }

    pub fn update(&mut self, index: usize, patch: &PassengerPatch) -> bool {
        self.roster.update(index, patch)
    }

    pub fn fare(&self, pricing: &PricingEngine) -> Result<Option<FareSummary>, PricingError> {
        self.record
            .trip
            .as_ref()
            .map(|trip| pricing.quote(trip.unit_fare, self.roster.len()))
            .transpose()
    }

    /// Back to the seat map, keeping whatever has been typed so far
    pub fn back(self) -> Result<HandoffParams, StageError> {
        let mut record = self.record;
        record.passengers = self.roster.into_passengers();
        Ok(HandoffParams::from_record(&record)?)
    }

    pub fn confirm(self) -> Result<HandoffParams, StageError> {
        let record = self.record.confirm_passengers(self.roster.into_passengers())?;
        Ok(HandoffParams::from_record(&record)?)
    }
}

/// Where a "Pay Now" press left the booking
#[derive(Debug)]
pub enum PaymentStep {
    Ticket(HandoffParams),
    Retry(PaymentFailure),
    Dropped,
}

pub struct BookingDetailsStage {
    gate: CheckoutGate,
    fare: Option<FareSummary>,
    currency: String,
}

impl BookingDetailsStage {
    pub fn from_params(params: HandoffParams, state: &AppState) -> Result<Self, StageError> {
        let trip = resolve_trip(&params, &state.catalog);
        let record = params.into_record(trip, BookingStage::BookingDetails);

        let fare = record
            .trip
            .as_ref()
            .map(|trip| state.pricing.quote(trip.unit_fare, record.passenger_count()))
            .transpose()?;

        let gate = CheckoutGate::new(record, ContactInfo::from_profile(&state.account))?;
        Ok(Self {
            gate,
            fare,
            currency: state.pricing.rules().currency.clone(),
        })
    }

    pub fn gate(&self) -> &CheckoutGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut CheckoutGate {
        &mut self.gate
    }

    pub fn fare(&self) -> Option<&FareSummary> {
        self.fare.as_ref()
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.gate.select_payment_method(method);
    }

    fn total(&self) -> Money {
        match &self.fare {
            Some(fare) => fare.total.clone(),
            None => Money {
                minor: 0,
                currency: self.currency.clone(),
            },
        }
    }

    pub async fn pay(
        &mut self,
        sheet: &dyn PaymentSheet,
        journal: &mut EventJournal,
    ) -> Result<PaymentStep, StageError> {
        let total = self.total();
        match self.gate.submit(sheet, &total).await? {
            GateDecision::Advance(record) => {
                Ok(PaymentStep::Ticket(HandoffParams::from_record(&record)?))
            }
            GateDecision::Rejected(failure) => {
                journal.record(BookingEvent::PaymentRejected(PaymentRejectedEvent {
                    booking_id: self.gate.record().id,
                    code: failure.code.clone(),
                    message: failure.message.clone(),
                    timestamp: Utc::now().timestamp(),
                }));
                Ok(PaymentStep::Retry(failure))
            }
            GateDecision::Discarded => Ok(PaymentStep::Dropped),
        }
    }

    /// Back navigation or dismissal
    pub fn leave(&mut self) {
        self.gate.abandon();
    }
}

pub struct TicketStage;

impl TicketStage {
    pub fn issue(params: &HandoffParams, state: &mut AppState) -> Result<Ticket, StageError> {
        let trip = resolve_trip(params, &state.catalog);
        let ticket = state.issuer.issue(params, trip.as_ref())?;

        state.journal.record(BookingEvent::TicketIssued(TicketIssuedEvent {
            // Deep links carry no booking id
            booking_id: ticket.booking_id.unwrap_or_else(Uuid::nil),
            ticket_id: ticket.id,
            barcode: ticket.barcode.value.clone(),
            passenger_count: ticket.passengers.len(),
            total_minor: ticket.fare.as_ref().map_or(0, |f| f.total.minor),
            currency: ticket
                .fare
                .as_ref()
                .map_or_else(
                    || state.pricing.rules().currency.clone(),
                    |f| f.total.currency.clone(),
                ),
            timestamp: ticket.issued_at.timestamp(),
        }));

        Ok(ticket)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("No train in the handoff")]
    MissingTrain,

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    SeatMap(#[from] SeatMapError),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),
}
