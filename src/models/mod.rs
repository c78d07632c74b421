//! Domain models for the external routing audit.
//!
//! This module contains the core data structures used throughout the application:
//! - [`Subnet`] - IPv4/IPv6 network literal
//! - [`Inventory`] and its hierarchy - fabrics down to external networks
//! - [`Finding`] - a pair of conflicting subnet declarations

mod fabric;
mod finding;
mod network;

// Re-export public types
pub use fabric::{
    Anomalies, ExternalNetwork, Fabric, GatewayGroup, Inventory, RoutingDomain, Tenant,
};
pub use finding::{ConflictKind, Finding, SubnetLocation};
pub use network::{Family, Subnet};
