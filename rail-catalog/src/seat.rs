use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Row letter(s) plus column number, e.g. `A1` or `J5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    row: String,
    column: u16,
}

impl SeatId {
    pub fn new(row: impl Into<String>, column: u16) -> Result<Self, SeatIdError> {
        let row = row.into().trim().to_ascii_uppercase();
        if row.is_empty() || !row.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SeatIdError::InvalidRow(row));
        }
        Ok(Self { row, column })
    }

    pub fn row(&self) -> &str {
        &self.row
    }

    pub fn column(&self) -> u16 {
        self.column
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for SeatId {
    type Err = SeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let split = token
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| SeatIdError::Malformed(token.to_string()))?;
        let (row, column) = token.split_at(split);
        if row.is_empty() {
            return Err(SeatIdError::Malformed(token.to_string()));
        }
        let column = column
            .parse::<u16>()
            .map_err(|_| SeatIdError::Malformed(token.to_string()))?;
        SeatId::new(row, column)
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatIdError {
    #[error("Malformed seat id: {0:?}")]
    Malformed(String),

    #[error("Seat row must be ASCII letters: {0:?}")]
    InvalidRow(String),
}

/// Ordered, duplicate-free list of seats in the order the user picked them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SeatId>", into = "Vec<SeatId>")]
pub struct SeatSelection {
    seats: Vec<SeatId>,
}

impl SeatSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, seat: &SeatId) -> bool {
        self.seats.contains(seat)
    }

    /// Append if absent; returns whether the seat was added.
    pub fn insert(&mut self, seat: SeatId) -> bool {
        if self.contains(&seat) {
            return false;
        }
        self.seats.push(seat);
        true
    }

    /// Remove keeping the relative order of the remaining seats.
    pub fn remove(&mut self, seat: &SeatId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| s != seat);
        self.seats.len() != before
    }

    pub fn get(&self, index: usize) -> Option<&SeatId> {
        self.seats.get(index)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeatId> {
        self.seats.iter()
    }

    pub fn as_slice(&self) -> &[SeatId] {
        &self.seats
    }

    /// "A1, A2" for summaries, "—" when empty
    pub fn summary(&self) -> String {
        if self.seats.is_empty() {
            return "—".to_string();
        }
        self.seats
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<SeatId> for SeatSelection {
    fn from_iter<I: IntoIterator<Item = SeatId>>(iter: I) -> Self {
        let mut selection = SeatSelection::new();
        for seat in iter {
            selection.insert(seat);
        }
        selection
    }
}

impl From<Vec<SeatId>> for SeatSelection {
    fn from(seats: Vec<SeatId>) -> Self {
        seats.into_iter().collect()
    }
}

impl From<SeatSelection> for Vec<SeatId> {
    fn from(selection: SeatSelection) -> Self {
        selection.seats
    }
}

impl<'a> IntoIterator for &'a SeatSelection {
    type Item = &'a SeatId;
    type IntoIter = std::slice::Iter<'a, SeatId>;

    fn into_iter(self) -> Self::IntoIter {
        self.seats.iter()
    }
}
