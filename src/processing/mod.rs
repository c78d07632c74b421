//! Inventory processing logic.
//!
//! This module contains the business logic of the audit:
//! - [`inventory`] - Assembly of raw records into the hierarchy
//! - [`conflicts`] - Duplicate default route and overlap detection
//! - [`statistics`] - Summary counters

mod conflicts;
mod inventory;
mod statistics;

// Re-export public functions
pub use conflicts::{analyze_routing_domain, find_conflicts};
pub use inventory::InventoryBuilder;
pub use statistics::Statistics;
