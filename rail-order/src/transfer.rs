//! Scalar-string encoding for handing a booking between decoupled stages.
//!
//! Seats travel as a comma-joined list, passengers as percent-encoded JSON.
//! Every `try_*` decoder reports what went wrong; the plain decoders are the
//! boundary versions and degrade to an empty collection instead.

use crate::models::{BookingRecord, BookingStage, ContactInfo, Passenger};
use rail_core::search::TrainOption;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rail_catalog::{SeatId, SeatIdError, SeatSelection};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Same reserved set as `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const SEATS: &str = "seats";
pub const PASSENGERS: &str = "passengers";
pub const EMAIL: &str = "email";
pub const PHONE: &str = "phone";
pub const ID_TYPE: &str = "idType";
pub const ID_NUMBER: &str = "idNumber";
pub const PAYMENT: &str = "payment";
pub const TRAIN: &str = "train";
pub const BOOKING: &str = "booking";

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Malformed percent escape at byte {0}")]
    MalformedEscape(usize),

    #[error("Decoded payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON array of passengers")]
    NotAnArray,

    #[error(transparent)]
    Seat(#[from] SeatIdError),
}

pub fn encode_seats(seats: &[SeatId]) -> String {
    seats
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Strict seat decode: every non-empty token must be a seat id.
pub fn try_decode_seats(raw: &str) -> Result<Vec<SeatId>, TransferError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<SeatId>().map_err(TransferError::from))
        .collect()
}

/// Boundary seat decode: unparseable tokens are dropped, duplicates collapse
/// to the first occurrence, and empty input is simply an empty selection.
pub fn decode_seats(raw: &str) -> SeatSelection {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<SeatId>() {
            Ok(seat) => Some(seat),
            Err(e) => {
                tracing::warn!("Dropping seat token {:?}: {}", token, e);
                None
            }
        })
        .collect()
}

pub fn encode_passengers(passengers: &[Passenger]) -> Result<String, TransferError> {
    let json = serde_json::to_string(passengers)?;
    Ok(utf8_percent_encode(&json, COMPONENT).to_string())
}

pub fn try_decode_passengers(raw: &str) -> Result<Vec<Passenger>, TransferError> {
    check_escapes(raw)?;
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| TransferError::InvalidUtf8)?;

    let value: serde_json::Value = serde_json::from_str(&decoded)?;
    if !value.is_array() {
        return Err(TransferError::NotAnArray);
    }
    Ok(serde_json::from_value(value)?)
}

/// Boundary passenger decode. Never fails; anything malformed is an empty list.
pub fn decode_passengers(raw: &str) -> Vec<Passenger> {
    match try_decode_passengers(raw) {
        Ok(passengers) => passengers,
        Err(e) => {
            tracing::warn!("Discarding malformed passengers payload: {}", e);
            Vec::new()
        }
    }
}

/// `percent_decode_str` passes bad escapes through untouched; reject them
/// the way a strict URI component decoder would.
fn check_escapes(raw: &str) -> Result<(), TransferError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(TransferError::MalformedEscape(i));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// String parameters handed across a navigation boundary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoffParams {
    params: BTreeMap<String, String>,
}

impl HandoffParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.params.insert(key.to_string(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Encode whatever the record holds so far. Card details never cross
    /// the boundary, only the method label.
    pub fn from_record(record: &BookingRecord) -> Result<Self, TransferError> {
        let mut params = HandoffParams::new();
        params.insert(BOOKING, record.id.to_string());
        params.insert(SEATS, encode_seats(record.selected_seats.as_slice()));

        if !record.passengers.is_empty() {
            params.insert(PASSENGERS, encode_passengers(&record.passengers)?);
        }
        if let Some(trip) = &record.trip {
            params.insert(TRAIN, trip.id.clone());
        }
        if let Some(contact) = &record.contact {
            params.insert(EMAIL, contact.email.clone());
            params.insert(PHONE, contact.phone.clone());
            params.insert(ID_TYPE, contact.id_type.clone());
            params.insert(ID_NUMBER, contact.id_number.expose().clone());
        }
        if let Some(method) = &record.payment_method {
            params.insert(PAYMENT, method.label());
        }
        Ok(params)
    }

    /// Rebuild the record on the receiving side of a navigation. The
    /// payment method never crosses, so it is always `None` here.
    pub fn into_record(self, trip: Option<TrainOption>, stage: BookingStage) -> BookingRecord {
        let mut record = BookingRecord::new(trip);
        if let Some(id) = self.booking_id() {
            record.id = id;
        }
        record.selected_seats = self.seats();
        record.passengers = self.passengers();
        record.contact = self.contact();
        record.stage = stage;
        record
    }

    pub fn seats(&self) -> SeatSelection {
        self.get(SEATS).map(decode_seats).unwrap_or_default()
    }

    pub fn passengers(&self) -> Vec<Passenger> {
        self.get(PASSENGERS).map(decode_passengers).unwrap_or_default()
    }

    /// Booking id, when the sender was a booking in progress rather than a deep link
    pub fn booking_id(&self) -> Option<Uuid> {
        self.get(BOOKING).and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn train_id(&self) -> Option<&str> {
        self.get(TRAIN)
    }

    pub fn payment_label(&self) -> Option<&str> {
        self.get(PAYMENT)
    }

    /// Contact block, only when every field was handed over
    pub fn contact(&self) -> Option<ContactInfo> {
        Some(ContactInfo {
            email: self.get(EMAIL)?.to_string(),
            phone: self.get(PHONE)?.to_string(),
            id_type: self.get(ID_TYPE)?.to_string(),
            id_number: self.get(ID_NUMBER)?.to_string().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStage;
    use proptest::prelude::*;
    use rail_core::payment::{CardDetails, CardType, PaymentMethod};

    fn seat(s: &str) -> SeatId {
        s.parse().unwrap()
    }

    #[test]
    fn test_seat_decode_trims_and_drops_empty() {
        assert_eq!(
            decode_seats(" A1, ,B2,,C3 ").as_slice(),
            &[seat("A1"), seat("B2"), seat("C3")]
        );
        assert!(decode_seats("").is_empty());
        assert!(decode_seats(" , ").is_empty());
    }

    #[test]
    fn test_seat_decode_strict_vs_soft() {
        assert!(try_decode_seats("A1,??").is_err());
        assert_eq!(decode_seats("A1,??,A1").as_slice(), &[seat("A1")]);
    }

    #[test]
    fn test_passenger_round_trip() {
        let passengers = vec![Passenger {
            name: "A".to_string(),
            passenger_type: "Adult".to_string(),
            seat: Some(seat("C1")),
        }];

        let encoded = encode_passengers(&passengers).unwrap();
        assert_eq!(
            encoded,
            "%5B%7B%22name%22%3A%22A%22%2C%22type%22%3A%22Adult%22%2C%22seat%22%3A%22C1%22%7D%5D"
        );
        assert_eq!(decode_passengers(&encoded), passengers);
    }

    #[test]
    fn test_broken_payloads_degrade_to_empty() {
        assert!(decode_passengers("%7Bbroken").is_empty());
        assert!(matches!(try_decode_passengers("%7Bbroken"), Err(TransferError::Json(_))));

        assert!(matches!(
            try_decode_passengers("%E0%A4%A"),
            Err(TransferError::MalformedEscape(_))
        ));
        assert!(matches!(try_decode_passengers("%zz"), Err(TransferError::MalformedEscape(0))));
        assert!(matches!(try_decode_passengers("%FF%FE"), Err(TransferError::InvalidUtf8)));
        assert!(matches!(
            try_decode_passengers("%7B%22name%22%3A%22A%22%7D"),
            Err(TransferError::NotAnArray)
        ));
        assert!(decode_passengers("").is_empty());
        assert!(decode_passengers("%5B1%2C2%5D").is_empty());
    }

    #[test]
    fn test_unicode_names_survive() {
        let passengers = vec![Passenger::new("রঞ্জন Rawat (Jr.)", None)];
        let encoded = encode_passengers(&passengers).unwrap();
        assert!(encoded.contains("(Jr.)"));
        assert_eq!(decode_passengers(&encoded), passengers);
    }

    #[test]
    fn test_handoff_params_from_record() {
        let mut record = BookingRecord::new(None);
        record.selected_seats = vec![seat("C1"), seat("C2")].into();
        record.passengers = vec![
            Passenger::new("A", Some(seat("C1"))),
            Passenger::new("", Some(seat("C2"))),
        ];
        record.contact = Some(ContactInfo {
            email: "a@example.com".to_string(),
            phone: "+880 1".to_string(),
            id_type: "Passport".to_string(),
            id_number: "713254896".to_string().into(),
        });
        let mut card = CardDetails::new(CardType::Credit);
        card.number = "4242424242424242".to_string().into();
        record.payment_method = Some(PaymentMethod::Card(card));
        record.stage = BookingStage::Ticket;

        let params = HandoffParams::from_record(&record).unwrap();
        assert_eq!(params.booking_id(), Some(record.id));
        assert_eq!(params.get(SEATS), Some("C1,C2"));
        assert_eq!(params.get(PAYMENT), Some("Card"));
        assert_eq!(params.seats(), record.selected_seats);
        assert_eq!(params.passengers(), record.passengers);
        assert_eq!(params.contact(), record.contact);
        assert!(params
            .keys()
            .filter(|k| *k != BOOKING)
            .all(|k| params.get(k).map_or(true, |v| !v.contains("4242"))));
    }

    #[test]
    fn test_into_record_rebuilds_stage() {
        let params = HandoffParams::new()
            .with(SEATS, "C1,C2")
            .with(PASSENGERS, "%7Bbroken");
        let record = params.into_record(None, BookingStage::PassengerDetails);

        assert_eq!(record.stage, BookingStage::PassengerDetails);
        assert_eq!(record.selected_seats.summary(), "C1, C2");
        assert!(record.passengers.is_empty());
        assert!(record.contact.is_none());
        assert!(record.payment_method.is_none());

        let id = Uuid::new_v4();
        let resumed = HandoffParams::new()
            .with(BOOKING, id.to_string())
            .into_record(None, BookingStage::BookingDetails);
        assert_eq!(resumed.id, id);
    }

    #[test]
    fn test_missing_params() {
        let params = HandoffParams::new().with(EMAIL, "a@example.com");
        assert!(params.seats().is_empty());
        assert!(params.passengers().is_empty());
        assert!(params.contact().is_none());
        assert!(params.train_id().is_none());
        assert!(params.with(BOOKING, "not-a-uuid").booking_id().is_none());
    }

    fn passenger_strategy() -> impl Strategy<Value = Passenger> {
        (
            any::<String>(),
            "[A-Za-z ]{0,10}",
            prop::option::of((0u8..26, 1u16..100)),
        )
            .prop_map(|(name, passenger_type, seat)| Passenger {
                name,
                passenger_type,
                seat: seat.map(|(row, col)| {
                    SeatId::new(((b'A' + row) as char).to_string(), col).unwrap()
                }),
            })
    }

    proptest! {
        #[test]
        fn passengers_round_trip(passengers in prop::collection::vec(passenger_strategy(), 0..6)) {
            let encoded = encode_passengers(&passengers).unwrap();
            prop_assert_eq!(try_decode_passengers(&encoded).unwrap(), passengers);
        }

        #[test]
        fn seats_round_trip(pairs in prop::collection::vec((0u8..26, 1u16..100), 0..12)) {
            let selection: SeatSelection = pairs
                .into_iter()
                .map(|(row, col)| SeatId::new(((b'A' + row) as char).to_string(), col).unwrap())
                .collect();
            let encoded = encode_seats(selection.as_slice());
            prop_assert_eq!(decode_seats(&encoded), selection);
        }

        #[test]
        fn decoding_garbage_never_panics(raw in any::<String>()) {
            let _ = decode_passengers(&raw);
            let _ = decode_seats(&raw);
        }
    }
}
