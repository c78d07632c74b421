//! APIC controller interaction.
//!
//! This module handles all controller-related operations:
//! - [`client`] - The [`FabricClient`] interface and its REST implementation
//! - [`records`] - Raw inventory records and managed object decoding
//! - [`cache`] - Snapshot caching of fetched records

mod cache;
mod client;
mod records;

// Re-export public types and functions
pub use cache::{cache_file_name, read_snapshot, read_snapshot_cache, write_snapshot};
pub use client::{collect_all, collect_snapshot, ApicClient, FabricClient};
pub use records::{
    FabricSnapshot, GatewayRelationRecord, RoutingDomainRecord, SubnetRecord, TenantRecord,
};
