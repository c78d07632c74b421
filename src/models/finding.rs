//! Conflict findings.

use super::{Family, Subnet};
use serde::Serialize;
use std::fmt;

/// Kind of routing conflict found inside one routing domain.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    #[serde(rename = "DUPLICATE_DEFAULT_V4")]
    DuplicateDefaultV4,
    #[serde(rename = "DUPLICATE_DEFAULT_V6")]
    DuplicateDefaultV6,
    Overlap,
}

impl ConflictKind {
    pub fn duplicate_default(family: Family) -> ConflictKind {
        match family {
            Family::V4 => ConflictKind::DuplicateDefaultV4,
            Family::V6 => ConflictKind::DuplicateDefaultV6,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ConflictKind::DuplicateDefaultV4 => "DUPLICATE_DEFAULT_V4",
            ConflictKind::DuplicateDefaultV6 => "DUPLICATE_DEFAULT_V6",
            ConflictKind::Overlap => "OVERLAP",
        };
        write!(f, "{s}")
    }
}

/// Where a subnet is declared below its routing domain.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetLocation {
    pub gateway_group: String,
    pub external_network: String,
    pub subnet: Subnet,
}

/// Two conflicting subnet declarations of the same routing domain.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: ConflictKind,
    pub fabric: String,
    pub tenant: String,
    pub routing_domain: String,
    pub a: SubnetLocation,
    pub b: SubnetLocation,
}

impl fmt::Display for SubnetLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}/{} {}",
            self.gateway_group, self.external_network, self.subnet
        )
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{kind} {fabric} {tenant}/{vrf}: [{a}] <-> [{b}]",
            kind = self.kind,
            fabric = self.fabric,
            tenant = self.tenant,
            vrf = self.routing_domain,
            a = self.a,
            b = self.b,
        )
    }
}
