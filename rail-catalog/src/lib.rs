pub mod seat;
pub mod seat_map;
pub mod pricing;
pub mod catalog;

pub use seat::{SeatId, SeatIdError, SeatSelection};
pub use seat_map::{SeatLayout, SeatMap, SeatMapError, SeatRow, SeatState};
pub use pricing::{FareRules, FareSummary, Money, PricingEngine, PricingError};
pub use catalog::{CatalogError, TrainCatalog, TrainListing};
