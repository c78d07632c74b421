//! Summary counters over an inventory and its findings.

use crate::models::{ConflictKind, Finding, Inventory};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub fabrics: usize,
    pub tenants: usize,
    pub routing_domains: usize,
    pub gateway_groups: usize,
    pub external_networks: usize,
    pub subnets: usize,
    pub findings: usize,
    pub duplicate_defaults_v4: usize,
    pub duplicate_defaults_v6: usize,
    pub overlaps: usize,
    pub invalid_addresses: usize,
    pub unresolved_relations: usize,
    pub unknown_routing_domains: usize,
    pub failed_fabrics: usize,
}

impl Statistics {
    /// Count everything in one read-only pass.
    pub fn collect(inventory: &Inventory, findings: &[Finding]) -> Statistics {
        let mut stats = Statistics {
            fabrics: inventory.fabrics.len(),
            findings: findings.len(),
            invalid_addresses: inventory.anomalies.invalid_addresses,
            unresolved_relations: inventory.anomalies.unresolved_relations,
            unknown_routing_domains: inventory.anomalies.unknown_routing_domains,
            failed_fabrics: inventory.anomalies.failed_fabrics.len(),
            ..Default::default()
        };

        for fabric in inventory.fabrics.values() {
            stats.tenants += fabric.tenants.len();
            for tenant in fabric.tenants.values() {
                stats.routing_domains += tenant.routing_domains.len();
                for rd in tenant.routing_domains.values() {
                    stats.gateway_groups += rd.gateway_groups.len();
                    for gw in rd.gateway_groups.values() {
                        stats.external_networks += gw.external_networks.len();
                        stats.subnets += gw
                            .external_networks
                            .values()
                            .map(|en| en.subnets.len())
                            .sum::<usize>();
                    }
                }
            }
        }

        for finding in findings {
            match finding.kind {
                ConflictKind::DuplicateDefaultV4 => stats.duplicate_defaults_v4 += 1,
                ConflictKind::DuplicateDefaultV6 => stats.duplicate_defaults_v6 += 1,
                ConflictKind::Overlap => stats.overlaps += 1,
            }
        }
        stats
    }

    /// Findings per subnet; 0.0 when there are no subnets.
    pub fn finding_rate(&self) -> f64 {
        if self.subnets == 0 {
            0.0
        } else {
            self.findings as f64 / self.subnets as f64
        }
    }

    /// Counter name and value, in report order.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("fabrics", self.fabrics),
            ("tenants", self.tenants),
            ("routing_domains", self.routing_domains),
            ("gateway_groups", self.gateway_groups),
            ("external_networks", self.external_networks),
            ("subnets", self.subnets),
            ("findings", self.findings),
            ("duplicate_defaults_v4", self.duplicate_defaults_v4),
            ("duplicate_defaults_v6", self.duplicate_defaults_v6),
            ("overlaps", self.overlaps),
            ("invalid_addresses", self.invalid_addresses),
            ("unresolved_relations", self.unresolved_relations),
            ("unknown_routing_domains", self.unknown_routing_domains),
            ("failed_fabrics", self.failed_fabrics),
        ]
    }
}
