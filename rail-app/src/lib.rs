pub mod journal;
pub mod stages;
pub mod state;

pub use journal::EventJournal;
pub use stages::{
    BookingDetailsStage, PassengerDetailsStage, PaymentStep, SeatSelectionStage, StageError,
    TicketStage,
};
pub use state::AppState;
