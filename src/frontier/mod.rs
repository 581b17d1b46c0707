//! URL frontier owned by the coordinator
//!
//! Holds the pending queue, the all-time seen set used for deduplication,
//! and the processed results in completion order.

mod state;

pub use state::{Frontier, FrontierSnapshot, ProcessedUrl};
