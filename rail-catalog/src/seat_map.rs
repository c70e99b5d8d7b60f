use crate::seat::{SeatId, SeatSelection};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Coach layout: row labels and the column numbers on either side of the aisle.
/// The aisle split is presentation only; the inventory is every row/column pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatLayout {
    pub rows: Vec<String>,
    pub left_columns: Vec<u16>,
    pub right_columns: Vec<u16>,
}

impl Default for SeatLayout {
    fn default() -> Self {
        Self {
            rows: ('A'..='J').map(String::from).collect(),
            left_columns: vec![1, 2],
            right_columns: vec![3, 4, 5],
        }
    }
}

impl SeatLayout {
    pub fn columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.left_columns.iter().chain(self.right_columns.iter()).copied()
    }

    /// Every seat, row-major, left side before right side
    pub fn seats(&self) -> Result<Vec<SeatId>, SeatMapError> {
        let per_row = self.left_columns.len() + self.right_columns.len();
        let mut seats = Vec::with_capacity(self.rows.len() * per_row);
        for row in &self.rows {
            for column in self.columns() {
                let seat = SeatId::new(row.clone(), column)
                    .map_err(|e| SeatMapError::InvalidLayout(e.to_string()))?;
                seats.push(seat);
            }
        }
        Ok(seats)
    }

    fn validate(&self) -> Result<(), SeatMapError> {
        if self.rows.is_empty() {
            return Err(SeatMapError::InvalidLayout("no rows".to_string()));
        }
        if self.left_columns.is_empty() && self.right_columns.is_empty() {
            return Err(SeatMapError::InvalidLayout("no columns".to_string()));
        }
        let mut columns = HashSet::new();
        if !self.columns().all(|c| columns.insert(c)) {
            return Err(SeatMapError::InvalidLayout("duplicate column".to_string()));
        }
        let mut rows = HashSet::new();
        if !self.rows.iter().all(|r| rows.insert(r.trim().to_ascii_uppercase())) {
            return Err(SeatMapError::InvalidLayout("duplicate row".to_string()));
        }
        Ok(())
    }
}

/// Resolved at query time, never stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Booked,
    Selected,
    Available,
}

/// One row of the grid split at the aisle, for whatever draws it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatRow {
    pub label: String,
    pub left: Vec<(SeatId, SeatState)>,
    pub right: Vec<(SeatId, SeatState)>,
}

/// Seat inventory for one trip plus the user's current selection.
///
/// Booked seats come from an external allocation source and are fixed for the
/// lifetime of the map. A fresh map always starts with an empty selection.
#[derive(Debug, Clone)]
pub struct SeatMap {
    layout: SeatLayout,
    inventory: HashSet<SeatId>,
    booked: HashSet<SeatId>,
    selection: SeatSelection,
}

impl SeatMap {
    pub fn new(
        layout: SeatLayout,
        booked: impl IntoIterator<Item = SeatId>,
    ) -> Result<Self, SeatMapError> {
        layout.validate()?;
        let inventory: HashSet<SeatId> = layout.seats()?.into_iter().collect();

        let mut booked_set = HashSet::new();
        for seat in booked {
            if inventory.contains(&seat) {
                booked_set.insert(seat);
            } else {
                tracing::warn!("Ignoring booked seat {} outside the configured layout", seat);
            }
        }

        Ok(Self {
            layout,
            inventory,
            booked: booked_set,
            selection: SeatSelection::new(),
        })
    }

    pub fn layout(&self) -> &SeatLayout {
        &self.layout
    }

    pub fn contains(&self, seat: &SeatId) -> bool {
        self.inventory.contains(seat)
    }

    /// Flip a seat in or out of the selection. Booked seats are left alone.
    pub fn toggle(&mut self, seat: &SeatId) -> Result<SeatState, SeatMapError> {
        self.ensure_known(seat)?;

        if self.booked.contains(seat) {
            tracing::debug!("Seat {} is booked, toggle ignored", seat);
            return Ok(SeatState::Booked);
        }

        if self.selection.remove(seat) {
            Ok(SeatState::Available)
        } else {
            self.selection.insert(seat.clone());
            Ok(SeatState::Selected)
        }
    }

    pub fn state_of(&self, seat: &SeatId) -> Result<SeatState, SeatMapError> {
        self.ensure_known(seat)?;
        Ok(self.resolve(seat))
    }

    pub fn selection(&self) -> &SeatSelection {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn available_count(&self) -> usize {
        self.inventory.len() - self.booked.len() - self.selection.len()
    }

    /// Hand the selection to the next stage. Continuing with nothing selected
    /// is refused.
    pub fn confirm_selection(&self) -> Result<SeatSelection, SeatMapError> {
        if self.selection.is_empty() {
            return Err(SeatMapError::EmptySelection);
        }
        Ok(self.selection.clone())
    }

    /// Grid rows with resolved states, in layout order
    pub fn seat_rows(&self) -> Vec<SeatRow> {
        self.layout
            .rows
            .iter()
            .map(|row| {
                let side = |columns: &[u16]| {
                    columns
                        .iter()
                        .filter_map(|&column| SeatId::new(row.clone(), column).ok())
                        .map(|seat| {
                            let state = self.resolve(&seat);
                            (seat, state)
                        })
                        .collect::<Vec<_>>()
                };
                SeatRow {
                    label: row.trim().to_ascii_uppercase(),
                    left: side(&self.layout.left_columns),
                    right: side(&self.layout.right_columns),
                }
            })
            .collect()
    }

    fn resolve(&self, seat: &SeatId) -> SeatState {
        if self.booked.contains(seat) {
            SeatState::Booked
        } else if self.selection.contains(seat) {
            SeatState::Selected
        } else {
            SeatState::Available
        }
    }

    fn ensure_known(&self, seat: &SeatId) -> Result<(), SeatMapError> {
        if self.inventory.contains(seat) {
            Ok(())
        } else {
            Err(SeatMapError::UnknownSeat(seat.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatMapError {
    #[error("Seat not in this coach: {0}")]
    UnknownSeat(String),

    #[error("At least one seat must be selected")]
    EmptySelection,

    #[error("Invalid seat layout: {0}")]
    InvalidLayout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seat(s: &str) -> SeatId {
        s.parse().unwrap()
    }

    fn coach() -> SeatMap {
        SeatMap::new(SeatLayout::default(), vec![seat("A3"), seat("B2")]).unwrap()
    }

    #[test]
    fn test_toggle_scenario() {
        let mut map = coach();

        map.toggle(&seat("A1")).unwrap();
        map.toggle(&seat("A2")).unwrap();
        map.toggle(&seat("A1")).unwrap();

        assert_eq!(map.selection().as_slice(), &[seat("A2")]);
        assert_eq!(map.state_of(&seat("A1")).unwrap(), SeatState::Available);
        assert_eq!(map.state_of(&seat("A2")).unwrap(), SeatState::Selected);
    }

    #[test]
    fn test_booked_seat_cannot_be_selected() {
        let mut map = coach();

        assert_eq!(map.toggle(&seat("A3")).unwrap(), SeatState::Booked);
        assert_eq!(map.state_of(&seat("A3")).unwrap(), SeatState::Booked);
        assert!(map.selection().is_empty());
    }

    #[test]
    fn test_state_of_agrees_with_grid() {
        let mut map = coach();
        map.toggle(&seat("C4")).unwrap();
        map.toggle(&seat("A3")).unwrap();

        for row in map.seat_rows() {
            for (id, state) in row.left.iter().chain(row.right.iter()) {
                assert_eq!(map.state_of(id).unwrap(), *state, "seat {}", id);
            }
        }
        assert_eq!(map.state_of(&seat("C4")).unwrap(), SeatState::Selected);
    }

    #[test]
    fn test_unknown_seat_is_an_error() {
        let mut map = coach();

        assert_eq!(
            map.toggle(&seat("K1")),
            Err(SeatMapError::UnknownSeat("K1".to_string()))
        );
        assert!(map.state_of(&seat("A6")).is_err());
        assert!(map.selection().is_empty());
    }

    #[test]
    fn test_confirm_requires_a_seat() {
        let mut map = coach();
        assert_eq!(map.confirm_selection(), Err(SeatMapError::EmptySelection));

        map.toggle(&seat("C1")).unwrap();
        map.toggle(&seat("C2")).unwrap();
        let confirmed = map.confirm_selection().unwrap();
        assert_eq!(confirmed.as_slice(), &[seat("C1"), seat("C2")]);
        assert_eq!(map.selected_count(), 2);
    }

    #[test]
    fn test_counts_and_rows() {
        let mut map = coach();
        map.toggle(&seat("J5")).unwrap();

        assert_eq!(map.available_count(), 50 - 2 - 1);

        let rows = map.seat_rows();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].left.len(), 2);
        assert_eq!(rows[0].right.len(), 3);
        assert_eq!(rows[0].right[0], (seat("A3"), SeatState::Booked));
        assert_eq!(rows[9].right[2], (seat("J5"), SeatState::Selected));
    }

    #[test]
    fn test_booked_outside_layout_is_ignored() {
        let map = SeatMap::new(SeatLayout::default(), vec![seat("Z9")]).unwrap();
        assert_eq!(map.available_count(), 50);
    }

    #[test]
    fn test_invalid_layouts() {
        let no_rows = SeatLayout { rows: vec![], ..SeatLayout::default() };
        assert!(matches!(SeatMap::new(no_rows, vec![]), Err(SeatMapError::InvalidLayout(_))));

        let dup = SeatLayout {
            rows: vec!["A".to_string()],
            left_columns: vec![1, 2],
            right_columns: vec![2, 3],
        };
        assert!(matches!(SeatMap::new(dup, vec![]), Err(SeatMapError::InvalidLayout(_))));

        let bad_row = SeatLayout {
            rows: vec!["1".to_string()],
            ..SeatLayout::default()
        };
        assert!(matches!(SeatMap::new(bad_row, vec![]), Err(SeatMapError::InvalidLayout(_))));
    }

    #[test]
    fn test_custom_layout() {
        let layout = SeatLayout {
            rows: vec!["AA".to_string(), "BB".to_string()],
            left_columns: vec![1],
            right_columns: vec![10, 11],
        };
        let mut map = SeatMap::new(layout, vec![]).unwrap();

        assert_eq!(map.toggle(&seat("BB11")).unwrap(), SeatState::Selected);
        assert!(map.toggle(&seat("A1")).is_err());
    }

    fn seat_strategy() -> impl Strategy<Value = SeatId> {
        (0u8..10, 1u16..=5).prop_map(|(row, column)| {
            SeatId::new(((b'A' + row) as char).to_string(), column).unwrap()
        })
    }

    proptest! {
        #[test]
        fn paired_toggles_restore_selection(
            history in prop::collection::vec(seat_strategy(), 0..20),
            target in seat_strategy(),
        ) {
            let mut map = coach();
            for s in &history {
                map.toggle(s).unwrap();
            }
            let before = map.selection().clone();

            map.toggle(&target).unwrap();
            map.toggle(&target).unwrap();

            // Order may change for the target itself, membership may not.
            let mut before_sorted: Vec<_> = before.iter().cloned().collect();
            let mut after_sorted: Vec<_> = map.selection().iter().cloned().collect();
            before_sorted.sort();
            after_sorted.sort();
            prop_assert_eq!(before_sorted, after_sorted);
            if !before.contains(&target) {
                prop_assert_eq!(&before, map.selection());
            }
        }

        #[test]
        fn booked_seats_stay_booked(history in prop::collection::vec(seat_strategy(), 0..30)) {
            let mut map = coach();
            for s in &history {
                map.toggle(s).unwrap();
                prop_assert_eq!(map.state_of(&seat("A3")).unwrap(), SeatState::Booked);
                prop_assert_eq!(map.state_of(&seat("B2")).unwrap(), SeatState::Booked);
            }
            prop_assert!(!map.selection().contains(&seat("A3")));
            prop_assert!(!map.selection().contains(&seat("B2")));
        }

        #[test]
        fn states_partition_inventory(history in prop::collection::vec(seat_strategy(), 0..30)) {
            let mut map = coach();
            for s in &history {
                map.toggle(s).unwrap();
            }

            let mut booked = 0;
            let mut selected = 0;
            let mut available = 0;
            for s in SeatLayout::default().seats().unwrap() {
                match map.state_of(&s).unwrap() {
                    SeatState::Booked => booked += 1,
                    SeatState::Selected => selected += 1,
                    SeatState::Available => available += 1,
                }
            }
            prop_assert_eq!(booked, 2);
            prop_assert_eq!(selected, map.selected_count());
            prop_assert_eq!(available, map.available_count());
            prop_assert_eq!(booked + selected + available, 50);
        }
    }
}
