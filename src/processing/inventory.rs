//! Inventory assembly.
//!
//! Turns the flat, independently fetched record sets of each fabric into the
//! typed [`Inventory`] hierarchy.

use crate::apic::FabricSnapshot;
use crate::error::{AuditError, ClientError};
use crate::models::{ExternalNetwork, Fabric, GatewayGroup, Inventory, RoutingDomain, Subnet, Tenant};
use std::collections::HashMap;

/// (fabric, tenant, gateway group)
type RelationKey = (String, String, String);

/// A subnet record waiting for its gateway group to resolve.
#[derive(Debug, Clone)]
struct PendingSubnet {
    fabric: String,
    tenant: String,
    gateway_group: String,
    external_network: String,
    literal: String,
    reason: AuditError,
}

impl PendingSubnet {
    /// fabric/tenant/routing domain/gateway group/external network
    fn location(&self, routing_domain: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.fabric, self.tenant, routing_domain, self.gateway_group, self.external_network
        )
    }
}

/// Builds an [`Inventory`] from raw records arriving in any order.
///
/// Subnets whose gateway group can't be placed yet are kept aside and
/// retried by [`resolve_pending`](Self::resolve_pending) and
/// [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct InventoryBuilder {
    inventory: Inventory,
    relations: HashMap<RelationKey, String>,
    pending: Vec<PendingSubnet>,
}

impl InventoryBuilder {
    pub fn new() -> InventoryBuilder {
        Default::default()
    }

    /// Register a fabric. Idempotent.
    pub fn add_fabric(&mut self, fabric: &str) -> &mut Fabric {
        self.inventory
            .fabrics
            .entry(fabric.to_string())
            .or_insert_with(|| Fabric {
                url: fabric.to_string(),
                ..Default::default()
            })
    }

    /// Add a tenant to a fabric. Idempotent.
    pub fn add_tenant(&mut self, fabric: &str, name: &str) -> &mut Tenant {
        self.add_fabric(fabric)
            .tenants
            .entry(name.to_string())
            .or_insert_with(|| Tenant {
                name: name.to_string(),
                ..Default::default()
            })
    }

    /// Add an empty routing domain to a tenant. Idempotent.
    pub fn add_routing_domain(&mut self, fabric: &str, tenant: &str, name: &str) {
        self.add_tenant(fabric, tenant)
            .routing_domains
            .entry(name.to_string())
            .or_insert_with(|| RoutingDomain::new(name));
    }

    /// Remember which routing domain a gateway group belongs to.
    ///
    /// The first relation wins; a gateway group never sits in two routing
    /// domains. The gateway group itself is created once a subnet for it arrives.
    pub fn record_gateway_relation(
        &mut self,
        fabric: &str,
        tenant: &str,
        gateway_group: &str,
        routing_domain: &str,
    ) {
        let key = (
            fabric.to_string(),
            tenant.to_string(),
            gateway_group.to_string(),
        );
        match self.relations.get(&key) {
            Some(previous) if previous != routing_domain => log::warn!(
                "Gateway group {fabric}/{tenant}/{gateway_group} already belongs to routing domain {previous}, ignoring relation to {routing_domain}"
            ),
            Some(_) => {}
            None => {
                self.relations.insert(key, routing_domain.to_string());
            }
        }
    }

    /// Place one external network subnet below its routing domain.
    ///
    /// * Unknown relation or routing domain: the subnet is deferred and the
    ///   anomaly returned; [`resolve_pending`](Self::resolve_pending) retries it.
    /// * Malformed literal: the subnet is dropped and counted.
    pub fn add_external_network_subnet(
        &mut self,
        fabric: &str,
        tenant: &str,
        gateway_group: &str,
        external_network: &str,
        literal: &str,
    ) -> Result<(), AuditError> {
        let result = self.submit(PendingSubnet {
            fabric: fabric.to_string(),
            tenant: tenant.to_string(),
            gateway_group: gateway_group.to_string(),
            external_network: external_network.to_string(),
            literal: literal.to_string(),
            // replaced by the actual outcome in submit()
            reason: AuditError::UnresolvedGatewayRelation {
                fabric: fabric.to_string(),
                tenant: tenant.to_string(),
                gateway_group: gateway_group.to_string(),
                external_network: external_network.to_string(),
            },
        });
        if let Err(e @ (AuditError::UnresolvedGatewayRelation { .. }
        | AuditError::UnknownRoutingDomain { .. })) = &result
        {
            log::warn!("Deferring subnet {literal}: {e}");
        }
        result
    }

    /// Retry every deferred subnet. Returns how many were placed.
    pub fn resolve_pending(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut resolved = 0;
        for subnet in pending {
            if self.submit(subnet).is_ok() {
                resolved += 1;
            }
        }
        if resolved > 0 {
            log::info!(
                "Resolved {resolved} deferred subnets, {} still pending",
                self.pending.len()
            );
        }
        resolved
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Abandon a fabric after a client failure.
    pub fn fabric_failed(&mut self, fabric: &str, error: &ClientError) {
        log::error!("Abandoning fabric {fabric}: {error}");
        self.inventory.fabrics.remove(fabric);
        self.relations.retain(|(f, _, _), _| f != fabric);
        self.pending.retain(|p| p.fabric != fabric);
        self.inventory
            .anomalies
            .failed_fabrics
            .push((fabric.to_string(), error.to_string()));
    }

    /// Feed every record of one fabric snapshot into the builder.
    ///
    /// A fabric that is already loaded is skipped, so two snapshots of the
    /// same controller never stack their subnets.
    pub fn load_snapshot(&mut self, snapshot: &FabricSnapshot) {
        let fabric = snapshot.fabric.as_str();
        if self.inventory.fabrics.contains_key(fabric) {
            log::warn!("Skipping snapshot of {fabric}: fabric already loaded");
            return;
        }
        log::info!("Loading snapshot of {fabric}");

        self.add_fabric(fabric);
        for tenant in &snapshot.tenants {
            self.add_tenant(fabric, &tenant.name);
        }
        for rd in &snapshot.routing_domains {
            self.add_routing_domain(fabric, &rd.tenant, &rd.name);
        }
        for rel in &snapshot.gateway_relations {
            self.record_gateway_relation(fabric, &rel.tenant, &rel.gateway_group, &rel.routing_domain);
        }
        let added = snapshot
            .subnets
            .iter()
            .filter(|s| {
                self.add_external_network_subnet(
                    fabric,
                    &s.tenant,
                    &s.gateway_group,
                    &s.external_network,
                    &s.ip,
                )
                .is_ok()
            })
            .count();
        log::info!(
            "{fabric}: placed {added} of {} subnets",
            snapshot.subnets.len()
        );
    }

    /// Resolve what can still be resolved and hand out the inventory.
    ///
    /// Subnets that never resolved are logged, counted and left out.
    pub fn finish(mut self) -> Inventory {
        self.resolve_pending();
        for p in &self.pending {
            log::error!(
                "Skipping subnet {} of {}/{}/{}/{}: {}",
                p.literal,
                p.fabric,
                p.tenant,
                p.gateway_group,
                p.external_network,
                p.reason
            );
            match p.reason {
                AuditError::UnknownRoutingDomain { .. } => {
                    self.inventory.anomalies.unknown_routing_domains += 1
                }
                _ => self.inventory.anomalies.unresolved_relations += 1,
            }
        }
        self.inventory
    }

    fn submit(&mut self, mut subnet: PendingSubnet) -> Result<(), AuditError> {
        match self.place(&subnet) {
            Ok(()) => Ok(()),
            Err(e @ AuditError::InvalidAddress { .. }) => {
                self.inventory.anomalies.invalid_addresses += 1;
                Err(e)
            }
            Err(e) => {
                subnet.reason = e.clone();
                self.pending.push(subnet);
                Err(e)
            }
        }
    }

    fn place(&mut self, p: &PendingSubnet) -> Result<(), AuditError> {
        let key = (p.fabric.clone(), p.tenant.clone(), p.gateway_group.clone());
        let rd_name = self
            .relations
            .get(&key)
            .ok_or_else(|| AuditError::UnresolvedGatewayRelation {
                fabric: p.fabric.clone(),
                tenant: p.tenant.clone(),
                gateway_group: p.gateway_group.clone(),
                external_network: p.external_network.clone(),
            })?;
        let rd = self
            .inventory
            .fabrics
            .get_mut(&p.fabric)
            .and_then(|f| f.tenants.get_mut(&p.tenant))
            .and_then(|t| t.routing_domains.get_mut(rd_name))
            .ok_or_else(|| AuditError::UnknownRoutingDomain {
                fabric: p.fabric.clone(),
                tenant: p.tenant.clone(),
                routing_domain: rd_name.clone(),
                gateway_group: p.gateway_group.clone(),
                external_network: p.external_network.clone(),
            })?;
        let subnet = Subnet::new(&p.literal).inspect_err(|e| {
            log::error!("Dropping subnet of {}: {e}", p.location(rd_name));
        })?;

        let gateway_group = rd
            .gateway_groups
            .entry(p.gateway_group.clone())
            .or_insert_with(|| GatewayGroup {
                name: p.gateway_group.clone(),
                ..Default::default()
            });
        gateway_group
            .external_networks
            .entry(p.external_network.clone())
            .or_insert_with(|| ExternalNetwork {
                name: p.external_network.clone(),
                subnets: Vec::new(),
            })
            .subnets
            .push(subnet);
        Ok(())
    }
}
