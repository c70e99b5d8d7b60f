use rail_shared::models::events::BookingEvent;
use tracing::{error, info};
use uuid::Uuid;

/// In-memory record of what happened to each booking. Every event is also
/// logged as JSON.
#[derive(Debug, Default)]
pub struct EventJournal {
    events: Vec<BookingEvent>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: BookingEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!("Booking event for {}: {}", event.booking_id(), payload),
            Err(e) => error!("Failed to serialize booking event for {}: {}", event.booking_id(), e),
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[BookingEvent] {
        &self.events
    }

    pub fn for_booking(&self, booking_id: Uuid) -> Vec<&BookingEvent> {
        self.events
            .iter()
            .filter(|e| e.booking_id() == booking_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rail_shared::models::events::PaymentRejectedEvent;

    fn rejected(booking_id: Uuid) -> BookingEvent {
        BookingEvent::PaymentRejected(PaymentRejectedEvent {
            booking_id,
            code: "X".to_string(),
            message: "Card declined".to_string(),
            timestamp: 0,
        })
    }

    #[test]
    fn test_filter_by_booking() {
        let mut journal = EventJournal::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        journal.record(rejected(a));
        journal.record(rejected(b));
        journal.record(rejected(a));

        assert_eq!(journal.len(), 3);
        assert_eq!(journal.for_booking(a).len(), 2);
        assert_eq!(journal.for_booking(b).len(), 1);
        assert!(journal.for_booking(Uuid::new_v4()).is_empty());
    }
}
