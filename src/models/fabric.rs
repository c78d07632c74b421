//! Fabric inventory hierarchy.
//!
//! Fabric → Tenant → RoutingDomain (VRF) → GatewayGroup (L3Out) →
//! ExternalNetwork (EN) → [`Subnet`] list. Every level owns its children,
//! keyed and ordered by name.

use super::Subnet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// External network policy grouping with its declared subnets.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ExternalNetwork {
    pub name: String,
    /// Subnets in the order they were declared.
    pub subnets: Vec<Subnet>,
}

/// External routing construct (L3Out) attached to one routing domain.
#[derive(Serialize, Debug, Clone, Default)]
pub struct GatewayGroup {
    pub name: String,
    pub external_networks: BTreeMap<String, ExternalNetwork>,
}

/// Layer-3 forwarding context (VRF). Conflicts are only searched within one.
#[derive(Serialize, Debug, Clone, Default)]
pub struct RoutingDomain {
    pub name: String,
    pub gateway_groups: BTreeMap<String, GatewayGroup>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Tenant {
    pub name: String,
    pub routing_domains: BTreeMap<String, RoutingDomain>,
}

/// One controller and everything loaded from it.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Fabric {
    /// Controller URL, e.g. `https://10.1.1.1`.
    pub url: String,
    pub tenants: BTreeMap<String, Tenant>,
}

/// Counters for records that were skipped while assembling the inventory.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Anomalies {
    pub invalid_addresses: usize,
    pub unresolved_relations: usize,
    pub unknown_routing_domains: usize,
    /// Fabrics abandoned because of a client failure, with the reason.
    pub failed_fabrics: Vec<(String, String)>,
}

/// The complete, read-only result of inventory assembly.
#[derive(Serialize, Debug, Clone, Default)]
pub struct Inventory {
    pub fabrics: BTreeMap<String, Fabric>,
    pub anomalies: Anomalies,
}

impl RoutingDomain {
    pub fn new(name: &str) -> RoutingDomain {
        RoutingDomain {
            name: name.to_string(),
            gateway_groups: BTreeMap::new(),
        }
    }

    /// All (gateway group, external network, subnet) triples in traversal order.
    pub fn subnets(&self) -> impl Iterator<Item = (&GatewayGroup, &ExternalNetwork, &Subnet)> {
        self.gateway_groups.values().flat_map(|gw| {
            gw.external_networks
                .values()
                .flat_map(move |en| en.subnets.iter().map(move |s| (gw, en, s)))
        })
    }
}

impl Inventory {
    /// Iterate every routing domain with its owning fabric and tenant.
    pub fn routing_domains(&self) -> impl Iterator<Item = (&Fabric, &Tenant, &RoutingDomain)> {
        self.fabrics.values().flat_map(|fabric| {
            fabric.tenants.values().flat_map(move |tenant| {
                tenant
                    .routing_domains
                    .values()
                    .map(move |rd| (fabric, tenant, rd))
            })
        })
    }
}

impl fmt::Display for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inventory ({} fabrics):", self.fabrics.len())?;
        for fabric in self.fabrics.values() {
            writeln!(f, "  - {} ({} tenants)", fabric.url, fabric.tenants.len())?;
            for tenant in fabric.tenants.values() {
                for rd in tenant.routing_domains.values() {
                    writeln!(
                        f,
                        "      {}/{} ({} gateway groups, {} subnets)",
                        tenant.name,
                        rd.name,
                        rd.gateway_groups.len(),
                        rd.subnets().count()
                    )?;
                }
            }
        }
        Ok(())
    }
}
