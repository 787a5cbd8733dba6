//! Process-lifetime stores for readings and alerts.

pub mod alerts;
pub mod readings;

pub use alerts::AlertStore;
pub use readings::{ReadingHistory, ReadingStore};
