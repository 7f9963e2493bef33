//! Conversion logic and session state

pub mod config;
pub mod convert;
pub mod currency;
pub mod history;
pub mod log;
pub mod notes;
pub mod session;

// Re-export main types for cleaner imports
pub use convert::{ConversionError, ConversionRequest, ConversionResult, convert};
pub use currency::{Currency, CurrencyRateProvider, RateTable};
pub use history::{HistoryEntry, HistoryLog};
pub use notes::{Note, NotesStore};
pub use session::Session;
