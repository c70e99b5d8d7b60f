use crate::seat::SeatId;
use crate::seat_map::{SeatLayout, SeatMap, SeatMapError};
use rail_core::search::{SearchQuery, TrainOption};
use serde::{Deserialize, Serialize};

/// A train run plus the seats already allocated on it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainListing {
    #[serde(flatten)]
    pub train: TrainOption,
    #[serde(default)]
    pub booked_seats: Vec<SeatId>,
}

/// Read-only train fixtures injected from configuration
#[derive(Debug, Clone)]
pub struct TrainCatalog {
    listings: Vec<TrainListing>,
    layout: SeatLayout,
}

impl TrainCatalog {
    pub fn new(listings: Vec<TrainListing>, layout: SeatLayout) -> Self {
        Self { listings, layout }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Matching trains, earliest departure first
    pub fn search(&self, query: &SearchQuery) -> Vec<&TrainOption> {
        let mut results: Vec<&TrainOption> = self
            .listings
            .iter()
            .map(|l| &l.train)
            .filter(|t| t.matches(query))
            .collect();
        results.sort_by_key(|t| (t.date, t.departure));
        tracing::debug!("Train search matched {} of {}", results.len(), self.listings.len());
        results
    }

    pub fn get(&self, train_id: &str) -> Result<&TrainListing, CatalogError> {
        self.listings
            .iter()
            .find(|l| l.train.id == train_id)
            .ok_or_else(|| CatalogError::NotFound(train_id.to_string()))
    }

    /// Fresh seat map for a train; selection always starts empty
    pub fn seat_map(&self, train_id: &str) -> Result<SeatMap, CatalogError> {
        let listing = self.get(train_id)?;
        Ok(SeatMap::new(self.layout.clone(), listing.booked_seats.iter().cloned())?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Train not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    SeatMap(#[from] SeatMapError),
}
