//! Data models for the vitals monitor.

pub mod alert;
pub mod reading;
pub mod vitals;

pub use alert::{Alert, AlertPatch, AlertStatus, Anomaly, NewAlert};
pub use reading::{AnomalySummary, Reading};
pub use vitals::{VitalParameter, VitalRange, VitalRangeTable};
