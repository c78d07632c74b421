//! Fabric client interface and the APIC REST implementation.

use super::records::{
    relation_from_mo, routing_domain_from_mo, subnet_from_mo, tenant_from_mo, ApicResponse,
    FabricSnapshot, GatewayRelationRecord, ManagedObject, RoutingDomainRecord, SubnetRecord,
    TenantRecord,
};
use crate::config::{self, Config};
use crate::error::ClientError;
use futures::future::join_all;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::StatusCode;
use std::time::Duration;

/// Source of raw inventory records for one fabric.
#[allow(async_fn_in_trait)]
pub trait FabricClient {
    /// Identity of the fabric, normally the controller URL.
    fn fabric(&self) -> &str;
    async fn login(&mut self) -> Result<(), ClientError>;
    async fn tenants(&self) -> Result<Vec<TenantRecord>, ClientError>;
    async fn routing_domains(&self, tenant: &str) -> Result<Vec<RoutingDomainRecord>, ClientError>;
    async fn gateway_relations(
        &self,
        tenant: &str,
    ) -> Result<Vec<GatewayRelationRecord>, ClientError>;
    async fn external_subnets(&self, tenant: &str) -> Result<Vec<SubnetRecord>, ClientError>;
}

/// Log in and fetch every record of one fabric.
pub async fn collect_snapshot<C: FabricClient>(
    client: &mut C,
) -> Result<FabricSnapshot, ClientError> {
    log::info!("Logging in to {}", client.fabric());
    client.login().await?;

    let tenants = client.tenants().await?;
    log::info!("{}: got {} tenants", client.fabric(), tenants.len());

    let mut snapshot = FabricSnapshot {
        fabric: client.fabric().to_string(),
        ..Default::default()
    };
    for tenant in &tenants {
        snapshot
            .routing_domains
            .extend(client.routing_domains(&tenant.name).await?);
        snapshot
            .gateway_relations
            .extend(client.gateway_relations(&tenant.name).await?);
        snapshot
            .subnets
            .extend(client.external_subnets(&tenant.name).await?);
    }
    snapshot.tenants = tenants;

    log::info!(
        "{}: tenants={} vrfs={} l3out_relations={} subnets={}",
        snapshot.fabric,
        snapshot.tenants.len(),
        snapshot.routing_domains.len(),
        snapshot.gateway_relations.len(),
        snapshot.subnets.len()
    );
    Ok(snapshot)
}

/// Collect all fabrics concurrently, one future per controller.
///
/// Results keep the order of `clients`; a failure only affects its own fabric.
pub async fn collect_all<C: FabricClient>(
    clients: &mut [C],
) -> Vec<(String, Result<FabricSnapshot, ClientError>)> {
    let jobs = clients.iter_mut().map(|client| async move {
        let fabric = client.fabric().to_string();
        let result = collect_snapshot(client).await;
        (fabric, result)
    });
    join_all(jobs).await
}

/// REST client for one APIC controller.
pub struct ApicClient {
    url: String,
    username: String,
    password: String,
    page_size: usize,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApicClient {
    pub fn new(url: &str, config: &Config) -> Result<ApicClient, ClientError> {
        let password = config
            .password
            .clone()
            .ok_or_else(|| ClientError::AuthenticationFailed {
                fabric: url.to_string(),
                reason: "no password configured (use --password or APIC_PASSWORD)".to_string(),
            })?;
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| transport(url, e))?;
        Ok(ApicClient {
            url: url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password,
            page_size: config.page_size.max(1),
            http,
            token: None,
        })
    }

    async fn get_page(&self, path: &str) -> Result<ApicResponse, ClientError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ClientError::AuthenticationFailed {
                fabric: self.url.clone(),
                reason: "not logged in".to_string(),
            })?;
        log::debug!("GET {}{}", self.url, path);
        let response = self
            .http
            .get(format!("{}{}", self.url, path))
            .header(COOKIE, format!("APIC-cookie={token}"))
            .send()
            .await
            .map_err(|e| transport(&self.url, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport(&self.url, e))?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AuthenticationFailed {
                fabric: self.url.clone(),
                reason: format!("HTTP {status} for {path}"),
            });
        }
        let page = decode_response(&self.url, &body)?;
        if !status.is_success() {
            return Err(ClientError::TransportError {
                fabric: self.url.clone(),
                reason: format!(
                    "HTTP {status} for {path}: {}",
                    page.error_text().unwrap_or_default()
                ),
            });
        }
        Ok(page)
    }

    /// Fetch all objects of `class` below `path`, following pages until
    /// `totalCount` objects have been received.
    async fn query_class(&self, path: &str, class: &str) -> Result<Vec<ManagedObject>, ClientError> {
        let mut objects: Vec<ManagedObject> = Vec::new();
        let mut page = 0usize;
        loop {
            let sep = if path.contains('?') { '&' } else { '?' };
            let response = self
                .get_page(&format!(
                    "{path}{sep}page={page}&page-size={}",
                    self.page_size
                ))
                .await?;
            let total = response
                .total()
                .map_err(|reason| ClientError::MalformedRecord {
                    fabric: self.url.clone(),
                    reason,
                })?;
            objects.extend(response.objects(class).cloned());

            log::debug!(
                "got page#{page:2} {class} +{count:3} => {received}/{total}",
                count = response.imdata.len(),
                received = objects.len(),
            );

            if response.imdata.is_empty() || page_is_last(page, self.page_size, total) {
                break;
            }
            page += 1;
            // Rate limiting pause
            tokio::time::sleep(Duration::from_millis(config::SLEEP_MSEC)).await;
        }
        Ok(objects)
    }

    async fn query_tenant_class(
        &self,
        tenant: &str,
        class: &str,
    ) -> Result<Vec<ManagedObject>, ClientError> {
        self.query_class(
            &format!(
                "/api/node/mo/uni/tn-{tenant}.json?query-target=subtree&target-subtree-class={class}"
            ),
            class,
        )
        .await
    }

    /// Decode each object, logging and skipping the ones that don't fit.
    fn decode_each<T>(
        &self,
        objects: Vec<ManagedObject>,
        decode: impl Fn(&ManagedObject) -> Result<T, ClientError>,
    ) -> Vec<T> {
        objects
            .iter()
            .filter_map(|mo| match decode(mo) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping record: {e}");
                    None
                }
            })
            .collect()
    }
}

impl FabricClient for ApicClient {
    fn fabric(&self) -> &str {
        &self.url
    }

    async fn login(&mut self) -> Result<(), ClientError> {
        let payload = serde_json::json!({
            "aaaUser": { "attributes": { "name": self.username, "pwd": self.password } }
        });
        let response = self
            .http
            .post(format!("{}/api/aaaLogin.json", self.url))
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| transport(&self.url, e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| transport(&self.url, e))?;
        let auth_failed = |reason: String| ClientError::AuthenticationFailed {
            fabric: self.url.clone(),
            reason,
        };

        let login = decode_response(&self.url, &body)
            .map_err(|e| auth_failed(format!("HTTP {status}: {e}")))?;
        if let Some(text) = login.error_text() {
            return Err(auth_failed(text));
        }
        if !status.is_success() {
            return Err(auth_failed(format!("HTTP {status}")));
        }
        let token = login
            .objects("aaaLogin")
            .find_map(|mo| mo.attributes.get("token").cloned())
            .ok_or_else(|| auth_failed("no token in login response".to_string()))?;

        log::info!("Logged in to {} as {}", self.url, self.username);
        self.token = Some(token);
        Ok(())
    }

    async fn tenants(&self) -> Result<Vec<TenantRecord>, ClientError> {
        let objects = self
            .query_class("/api/node/class/fvTenant.json", "fvTenant")
            .await?;
        Ok(self.decode_each(objects, |mo| tenant_from_mo(&self.url, mo)))
    }

    async fn routing_domains(&self, tenant: &str) -> Result<Vec<RoutingDomainRecord>, ClientError> {
        let objects = self.query_tenant_class(tenant, "fvCtx").await?;
        Ok(self.decode_each(objects, |mo| routing_domain_from_mo(&self.url, tenant, mo)))
    }

    async fn gateway_relations(
        &self,
        tenant: &str,
    ) -> Result<Vec<GatewayRelationRecord>, ClientError> {
        let objects = self.query_tenant_class(tenant, "l3extRsEctx").await?;
        Ok(self.decode_each(objects, |mo| relation_from_mo(&self.url, mo)))
    }

    async fn external_subnets(&self, tenant: &str) -> Result<Vec<SubnetRecord>, ClientError> {
        let objects = self.query_tenant_class(tenant, "l3extSubnet").await?;
        Ok(self.decode_each(objects, |mo| subnet_from_mo(&self.url, mo)))
    }
}

fn transport(fabric: &str, e: reqwest::Error) -> ClientError {
    let reason = if e.is_timeout() {
        format!("timeout: {e}")
    } else {
        e.to_string()
    };
    ClientError::TransportError {
        fabric: fabric.to_string(),
        reason,
    }
}

/// True when `page` (zero based) is the last page for `total` objects.
fn page_is_last(page: usize, page_size: usize, total: usize) -> bool {
    (page + 1) * page_size >= total
}

fn decode_response(fabric: &str, body: &str) -> Result<ApicResponse, ClientError> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::debug!("BODY START:\n\n{}\n\nBODY END\n", body);
        ClientError::MalformedRecord {
            fabric: fabric.to_string(),
            reason: format!("path={} error={}", e.path(), e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_page_is_last() {
        assert!(page_is_last(0, 500, 0));
        assert!(page_is_last(0, 500, 500));
        assert!(!page_is_last(0, 500, 501));
        assert!(page_is_last(1, 500, 501));
        assert!(!page_is_last(1, 2, 5));
        assert!(page_is_last(2, 2, 5));
    }

    #[test]
    fn test_decode_response_malformed() {
        let err = decode_response("f1", r#"{"totalCount":"1","imdata":{"oops":1}}"#).unwrap_err();
        match err {
            ClientError::MalformedRecord { fabric, reason } => {
                assert_eq!(fabric, "f1");
                assert!(reason.contains("imdata"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_new_without_password() {
        let config = Config::parse_from(["fabric-route-audit", "10.0.0.1"]);
        if config.password.is_some() {
            // APIC_PASSWORD set in the environment
            return;
        }
        let err = ApicClient::new("https://10.0.0.1", &config).err().unwrap();
        assert!(matches!(err, ClientError::AuthenticationFailed { .. }));
    }

    #[test]
    fn test_new_trims_url() {
        let config = Config::parse_from(["fabric-route-audit", "-p", "secret", "--page-size", "0"]);
        let client = ApicClient::new("https://10.0.0.1/", &config).unwrap();
        assert_eq!(client.fabric(), "https://10.0.0.1");
        assert_eq!(client.page_size, 1);
    }
}
