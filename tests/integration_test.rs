//! Integration tests for fabric-route-audit
//!
//! These tests verify the complete workflow from fabric records to findings.

use fabric_route_audit::apic::{
    collect_snapshot, read_snapshot, FabricClient, FabricSnapshot, GatewayRelationRecord,
    RoutingDomainRecord, SubnetRecord, TenantRecord,
};
use fabric_route_audit::error::ClientError;
use fabric_route_audit::models::ConflictKind;
use fabric_route_audit::{audit_fabrics, audit_snapshot_files};
use std::path::{Path, PathBuf};

const SNAPSHOT_01: &str = "src/tests/test_data/fabric_snapshot_01.json";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Failure {
    None,
    Login,
    Subnets,
}

/// In-memory fabric serving the records of a snapshot.
struct MockClient {
    snapshot: FabricSnapshot,
    failure: Failure,
}

impl MockClient {
    fn new(fabric: &str, failure: Failure) -> MockClient {
        let mut snapshot = read_snapshot(Path::new(SNAPSHOT_01)).expect("Error reading snapshot");
        snapshot.fabric = fabric.to_string();
        MockClient { snapshot, failure }
    }
}

impl FabricClient for MockClient {
    fn fabric(&self) -> &str {
        &self.snapshot.fabric
    }

    async fn login(&mut self) -> Result<(), ClientError> {
        if self.failure == Failure::Login {
            return Err(ClientError::AuthenticationFailed {
                fabric: self.snapshot.fabric.clone(),
                reason: "Username or password is incorrect".to_string(),
            });
        }
        Ok(())
    }

    async fn tenants(&self) -> Result<Vec<TenantRecord>, ClientError> {
        Ok(self.snapshot.tenants.clone())
    }

    async fn routing_domains(&self, tenant: &str) -> Result<Vec<RoutingDomainRecord>, ClientError> {
        Ok(self
            .snapshot
            .routing_domains
            .iter()
            .filter(|r| r.tenant == tenant)
            .cloned()
            .collect())
    }

    async fn gateway_relations(
        &self,
        tenant: &str,
    ) -> Result<Vec<GatewayRelationRecord>, ClientError> {
        Ok(self
            .snapshot
            .gateway_relations
            .iter()
            .filter(|r| r.tenant == tenant)
            .cloned()
            .collect())
    }

    async fn external_subnets(&self, tenant: &str) -> Result<Vec<SubnetRecord>, ClientError> {
        if self.failure == Failure::Subnets {
            return Err(ClientError::TransportError {
                fabric: self.snapshot.fabric.clone(),
                reason: "connection reset by peer".to_string(),
            });
        }
        Ok(self
            .snapshot
            .subnets
            .iter()
            .filter(|r| r.tenant == tenant)
            .cloned()
            .collect())
    }
}

#[test]
fn test_snapshot_file_workflow() {
    let audit = audit_snapshot_files(&[PathBuf::from(SNAPSHOT_01)]);

    let kinds: Vec<ConflictKind> = audit.findings.iter().map(|f| f.kind).collect();
    // common/default comes before prod/VRF1 in traversal order
    assert_eq!(
        kinds,
        vec![
            ConflictKind::DuplicateDefaultV6,
            ConflictKind::Overlap,
            ConflictKind::DuplicateDefaultV4,
            ConflictKind::Overlap,
        ]
    );
    assert_eq!(audit.findings[1].a.subnet.to_string(), "2001:db8::/32");
    assert_eq!(audit.findings[1].b.subnet.to_string(), "2001:db8:1::/48");
    assert_eq!(audit.findings[3].routing_domain, "VRF1");
    assert_eq!(audit.findings[3].a.gateway_group, "L3OUT-A");
    assert_eq!(audit.findings[3].b.gateway_group, "L3OUT-B");

    // VRF2 repeats 10.0.0.0/24 but is a separate routing domain
    assert!(audit.findings.iter().all(|f| f.routing_domain != "VRF2"));
    assert_eq!(audit.stats.subnets, 10);
    assert_eq!(audit.stats.findings, 4);
}

#[test]
fn test_unreadable_snapshot_is_skipped() {
    let audit = audit_snapshot_files(&[
        PathBuf::from("src/tests/test_data/missing.json"),
        PathBuf::from(SNAPSHOT_01),
    ]);
    assert_eq!(audit.stats.fabrics, 1);
    assert_eq!(audit.stats.findings, 4);
}

#[test]
fn test_repeated_snapshot_adds_no_findings() {
    let audit = audit_snapshot_files(&[PathBuf::from(SNAPSHOT_01), PathBuf::from(SNAPSHOT_01)]);
    assert_eq!(audit.stats.fabrics, 1);
    assert_eq!(audit.stats.subnets, 10);
    assert_eq!(audit.stats.findings, 4);
}

#[tokio::test]
async fn test_collect_snapshot_matches_records() {
    let mut client = MockClient::new("https://10.10.10.1", Failure::None);
    let snapshot = collect_snapshot(&mut client)
        .await
        .expect("Error collecting snapshot");
    let expected = read_snapshot(Path::new(SNAPSHOT_01)).expect("Error reading snapshot");
    assert_eq!(snapshot, expected);
}

#[tokio::test]
async fn test_one_fabric_fails_authentication() {
    let mut clients = vec![
        MockClient::new("https://10.1.1.1", Failure::Login),
        MockClient::new("https://10.2.2.2", Failure::None),
    ];
    let audit = audit_fabrics(&mut clients).await;

    assert_eq!(audit.stats.fabrics, 1);
    assert_eq!(audit.stats.failed_fabrics, 1);
    assert_eq!(
        audit.inventory.anomalies.failed_fabrics[0].0,
        "https://10.1.1.1"
    );
    assert!(audit.inventory.anomalies.failed_fabrics[0]
        .1
        .contains("authentication failed"));
    assert_eq!(audit.findings.len(), 4);
    assert!(audit.findings.iter().all(|f| f.fabric == "https://10.2.2.2"));
}

#[tokio::test]
async fn test_transport_error_abandons_fabric() {
    let mut clients = vec![
        MockClient::new("https://10.1.1.1", Failure::None),
        MockClient::new("https://10.2.2.2", Failure::Subnets),
    ];
    let audit = audit_fabrics(&mut clients).await;

    assert_eq!(audit.stats.fabrics, 1);
    assert_eq!(audit.stats.failed_fabrics, 1);
    assert!(!audit.inventory.fabrics.contains_key("https://10.2.2.2"));
    assert!(audit.findings.iter().all(|f| f.fabric == "https://10.1.1.1"));
}

#[tokio::test]
async fn test_all_fabrics_fail() {
    let mut clients = vec![MockClient::new("https://10.1.1.1", Failure::Login)];
    let audit = audit_fabrics(&mut clients).await;
    assert!(audit.findings.is_empty());
    assert_eq!(audit.stats.subnets, 0);
    assert_eq!(audit.stats.finding_rate(), 0.0);
}
