//! IPv4/IPv6 subnet literal wrapper.
//!
//! Provides [`Subnet`], an immutable validated network, along with the
//! predicates used by conflict analysis.

use crate::error::AuditError;
use ipnet::IpNet;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address family of a [`Subnet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    V4,
    V6,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// A validated IP network as declared on an external network.
///
/// Host bits are masked off on parse (`10.0.0.5/24` becomes `10.0.0.0/24`)
/// and a bare address is read as a host route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subnet {
    net: IpNet,
}

impl Subnet {
    /// Parse a subnet literal, e.g. "10.0.0.0/24" or "2001:db8::/32".
    pub fn new(literal: &str) -> Result<Subnet, AuditError> {
        let literal = literal.trim();
        let invalid = |reason: String| AuditError::InvalidAddress {
            literal: literal.to_string(),
            reason,
        };

        let net = if literal.contains('/') {
            IpNet::from_str(literal).map_err(|e| invalid(e.to_string()))?
        } else {
            let addr = IpAddr::from_str(literal).map_err(|e| invalid(e.to_string()))?;
            let host_len = match addr {
                IpAddr::V4(_) => 32,
                IpAddr::V6(_) => 128,
            };
            IpNet::new(addr, host_len).map_err(|e| invalid(e.to_string()))?
        };

        Ok(Subnet { net: net.trunc() })
    }

    pub fn family(&self) -> Family {
        match self.net {
            IpNet::V4(_) => Family::V4,
            IpNet::V6(_) => Family::V6,
        }
    }

    /// True for 0.0.0.0/0 and ::/0.
    pub fn is_default_route(&self) -> bool {
        self.net.prefix_len() == 0
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// True if the two address ranges intersect.
    ///
    /// Both subnets must share a family; callers partition by [`Family`]
    /// before comparing.
    pub fn overlaps(&self, other: &Subnet) -> bool {
        debug_assert_eq!(
            self.family(),
            other.family(),
            "overlaps() called across address families: {self} vs {other}"
        );
        // Aligned networks either nest or are disjoint.
        self.net.contains(&other.net) || other.net.contains(&self.net)
    }
}

impl FromStr for Subnet {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subnet::new(s)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.net.network(), self.net.prefix_len())
    }
}

impl Serialize for Subnet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Subnet {
    fn deserialize<D>(deserializer: D) -> Result<Subnet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Subnet::new(&s).map_err(de::Error::custom)
    }
}
