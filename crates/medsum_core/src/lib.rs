pub mod domain;
pub mod insight;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use domain::{Document, Insight, User};
pub use insight::{InsightState, PatientInsightState};
pub use ports::{DatabaseService, PortError, PortResult, StorageService};
