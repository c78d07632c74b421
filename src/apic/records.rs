//! Raw inventory records and their decoding from APIC managed objects.

use crate::error::ClientError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// L3Out → VRF relation, dn `uni/tn-{tenant}/out-{l3out}/rsectx`.
static RELATION_DN_REGEX: OnceLock<Regex> = OnceLock::new();
/// External subnet, dn `uni/tn-{tenant}/out-{l3out}/instP-{en}/extsubnet-[{ip}]`.
static SUBNET_DN_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_relation_dn_regex() -> &'static Regex {
    RELATION_DN_REGEX.get_or_init(|| {
        Regex::new(r"^uni/tn-([^/]+)/out-([^/]+)/rsectx$").expect("Invalid Regex")
    })
}

fn get_subnet_dn_regex() -> &'static Regex {
    SUBNET_DN_REGEX.get_or_init(|| {
        Regex::new(r"^uni/tn-([^/]+)/out-([^/]+)/instP-([^/]+)/extsubnet-\[(.+)\]$")
            .expect("Invalid Regex")
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TenantRecord {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RoutingDomainRecord {
    pub tenant: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatewayRelationRecord {
    pub tenant: String,
    pub gateway_group: String,
    pub routing_domain: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SubnetRecord {
    pub tenant: String,
    pub gateway_group: String,
    pub external_network: String,
    /// Unparsed literal as configured on the controller.
    pub ip: String,
}

/// Every raw record fetched from one fabric. Also the on-disk cache format.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FabricSnapshot {
    pub fabric: String,
    pub tenants: Vec<TenantRecord>,
    pub routing_domains: Vec<RoutingDomainRecord>,
    pub gateway_relations: Vec<GatewayRelationRecord>,
    pub subnets: Vec<SubnetRecord>,
}

/// One page of an APIC class query.
#[derive(Deserialize, Debug, Default)]
pub struct ApicResponse {
    #[serde(rename = "totalCount", default)]
    pub total_count: String,
    #[serde(default)]
    pub imdata: Vec<BTreeMap<String, ManagedObject>>,
}

/// A managed object body; APIC sends every attribute as a string.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ManagedObject {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ApicResponse {
    pub fn total(&self) -> Result<usize, String> {
        if self.total_count.is_empty() {
            return Ok(self.imdata.len());
        }
        self.total_count
            .parse()
            .map_err(|e| format!("invalid totalCount '{}': {e}", self.total_count))
    }

    /// Objects of the given class in this page; other classes are ignored.
    pub fn objects<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a ManagedObject> {
        self.imdata.iter().filter_map(move |item| item.get(class))
    }

    /// The message of an `error` object, if the controller returned one.
    pub fn error_text(&self) -> Option<String> {
        self.objects("error").next().map(|mo| {
            mo.attributes
                .get("text")
                .cloned()
                .unwrap_or_else(|| "unknown error".to_string())
        })
    }
}

impl ManagedObject {
    fn attr(&self, fabric: &str, name: &str) -> Result<&str, ClientError> {
        self.attributes
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| ClientError::MalformedRecord {
                fabric: fabric.to_string(),
                reason: format!(
                    "missing attribute '{name}' in dn={}",
                    self.attributes.get("dn").map(|s| s.as_str()).unwrap_or("?")
                ),
            })
    }
}

pub fn tenant_from_mo(fabric: &str, mo: &ManagedObject) -> Result<TenantRecord, ClientError> {
    Ok(TenantRecord {
        name: mo.attr(fabric, "name")?.to_string(),
    })
}

pub fn routing_domain_from_mo(
    fabric: &str,
    tenant: &str,
    mo: &ManagedObject,
) -> Result<RoutingDomainRecord, ClientError> {
    Ok(RoutingDomainRecord {
        tenant: tenant.to_string(),
        name: mo.attr(fabric, "name")?.to_string(),
    })
}

/// Decode an `l3extRsEctx` object.
pub fn relation_from_mo(
    fabric: &str,
    mo: &ManagedObject,
) -> Result<GatewayRelationRecord, ClientError> {
    let dn = mo.attr(fabric, "dn")?;
    let caps = get_relation_dn_regex()
        .captures(dn)
        .ok_or_else(|| ClientError::MalformedRecord {
            fabric: fabric.to_string(),
            reason: format!("unexpected l3extRsEctx dn '{dn}'"),
        })?;
    Ok(GatewayRelationRecord {
        tenant: caps[1].to_string(),
        gateway_group: caps[2].to_string(),
        routing_domain: mo.attr(fabric, "tnFvCtxName")?.to_string(),
    })
}

/// Decode an `l3extSubnet` object.
pub fn subnet_from_mo(fabric: &str, mo: &ManagedObject) -> Result<SubnetRecord, ClientError> {
    let dn = mo.attr(fabric, "dn")?;
    let caps = get_subnet_dn_regex()
        .captures(dn)
        .ok_or_else(|| ClientError::MalformedRecord {
            fabric: fabric.to_string(),
            reason: format!("unexpected l3extSubnet dn '{dn}'"),
        })?;
    // Prefer the ip attribute; the dn carries the same literal.
    let ip = match mo.attributes.get("ip") {
        Some(ip) => ip.to_string(),
        None => caps[4].to_string(),
    };
    Ok(SubnetRecord {
        tenant: caps[1].to_string(),
        gateway_group: caps[2].to_string(),
        external_network: caps[3].to_string(),
        ip,
    })
}
