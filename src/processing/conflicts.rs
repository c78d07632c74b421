//! Conflict detection within routing domains.
//!
//! Every routing domain is analysed on its own: its subnets are split by
//! address family and by default route, then duplicate defaults and
//! overlapping specific subnets are reported.

use crate::models::{
    ConflictKind, Family, Finding, Inventory, RoutingDomain, Subnet, SubnetLocation,
};
use itertools::Itertools;

/// A subnet together with where it was declared.
#[derive(Debug, Clone, Copy)]
struct Tagged<'a> {
    gateway_group: &'a str,
    external_network: &'a str,
    subnet: &'a Subnet,
}

impl Tagged<'_> {
    fn location(&self) -> SubnetLocation {
        SubnetLocation {
            gateway_group: self.gateway_group.to_string(),
            external_network: self.external_network.to_string(),
            subnet: *self.subnet,
        }
    }
}

/// Subnets of one family in traversal order.
#[derive(Debug, Default)]
struct Buckets<'a> {
    defaults: Vec<Tagged<'a>>,
    specifics: Vec<Tagged<'a>>,
}

/// Find all conflicts of the inventory, in discovery order.
pub fn find_conflicts(inventory: &Inventory) -> Vec<Finding> {
    log::info!("Analyzing data");
    let mut findings = Vec::new();

    for (fabric, tenant, rd) in inventory.routing_domains() {
        let before = findings.len();
        analyze_routing_domain(&fabric.url, &tenant.name, rd, &mut findings);
        if findings.len() > before {
            log::debug!(
                "{}/{}/{}: {} conflicts",
                fabric.url,
                tenant.name,
                rd.name,
                findings.len() - before
            );
        }
    }

    log::info!("Found {} conflicts", findings.len());
    findings
}

/// Append the conflicts of one routing domain to `findings`.
///
/// Per family: every default route beyond the first is paired with the
/// first one, then every overlapping pair of specific subnets is reported,
/// also when both belong to the same gateway group.
pub fn analyze_routing_domain(
    fabric: &str,
    tenant: &str,
    rd: &RoutingDomain,
    findings: &mut Vec<Finding>,
) {
    let mut v4 = Buckets::default();
    let mut v6 = Buckets::default();

    for (gw, en, subnet) in rd.subnets() {
        let buckets = match subnet.family() {
            Family::V4 => &mut v4,
            Family::V6 => &mut v6,
        };
        let tagged = Tagged {
            gateway_group: &gw.name,
            external_network: &en.name,
            subnet,
        };
        if subnet.is_default_route() {
            buckets.defaults.push(tagged);
        } else {
            buckets.specifics.push(tagged);
        }
    }

    let finding = |kind: ConflictKind, a: &Tagged, b: &Tagged| Finding {
        kind,
        fabric: fabric.to_string(),
        tenant: tenant.to_string(),
        routing_domain: rd.name.clone(),
        a: a.location(),
        b: b.location(),
    };

    for (family, buckets) in [(Family::V4, &v4), (Family::V6, &v6)] {
        if let Some((first, extra)) = buckets.defaults.split_first() {
            for duplicate in extra {
                findings.push(finding(
                    ConflictKind::duplicate_default(family),
                    first,
                    duplicate,
                ));
            }
        }
    }

    // Same family only, so overlaps() never sees mixed families.
    for buckets in [&v4, &v6] {
        for (a, b) in buckets.specifics.iter().tuple_combinations() {
            if a.subnet.overlaps(b.subnet) {
                findings.push(finding(ConflictKind::Overlap, a, b));
            }
        }
    }
}
