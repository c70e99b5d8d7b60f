use crate::models::{Passenger, PassengerPatch, DEFAULT_PASSENGER_TYPE};
use rail_catalog::SeatSelection;

/// Keeps the passenger list in step with the seat selection
#[derive(Debug, Clone)]
pub struct PassengerRoster {
    passengers: Vec<Passenger>,
    default_name: String,
}

impl PassengerRoster {
    /// Empty roster; the first `sync` fills it. `default_name` is the account
    /// holder and only ever lands on the first passenger.
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            passengers: Vec::new(),
            default_name: default_name.into(),
        }
    }

    /// Resume with passengers decoded from an earlier stage
    pub fn with_passengers(default_name: impl Into<String>, passengers: Vec<Passenger>) -> Self {
        Self {
            passengers,
            default_name: default_name.into(),
        }
    }

    /// Re-derive the roster for a (possibly changed) selection.
    ///
    /// Length becomes `max(1, seats)`. Name and type survive at indices that
    /// exist before and after; seats are always re-read by position; entries
    /// past the new length are dropped.
    pub fn sync(&mut self, selection: &SeatSelection) {
        let count = selection.len().max(1);
        let previous = std::mem::take(&mut self.passengers);

        self.passengers = (0..count)
            .map(|i| {
                let (name, passenger_type) = match previous.get(i) {
                    Some(prev) => (prev.name.clone(), prev.passenger_type.clone()),
                    None if i == 0 => {
                        (self.default_name.clone(), DEFAULT_PASSENGER_TYPE.to_string())
                    }
                    None => (String::new(), DEFAULT_PASSENGER_TYPE.to_string()),
                };
                Passenger {
                    name,
                    passenger_type,
                    seat: selection.get(i).cloned(),
                }
            })
            .collect();

        tracing::debug!(
            "Roster synced: {} passengers (was {}) for {} seats",
            self.passengers.len(),
            previous.len(),
            selection.len()
        );
    }

    /// Apply a partial edit to one passenger. Out-of-range indices are ignored.
    pub fn update(&mut self, index: usize, patch: &PassengerPatch) -> bool {
        match self.passengers.get_mut(index) {
            Some(passenger) => {
                patch.apply(passenger);
                true
            }
            None => {
                tracing::debug!(
                    "Ignoring passenger update at index {} (len {})",
                    index,
                    self.passengers.len()
                );
                false
            }
        }
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }

    pub fn into_passengers(self) -> Vec<Passenger> {
        self.passengers
    }
}
