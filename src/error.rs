//! Error types for inventory assembly and controller access.

use thiserror::Error;

/// Per-record anomalies raised while assembling the inventory.
///
/// None of these abort a run: the offending record is skipped (or deferred)
/// and the anomaly is logged and counted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("invalid address '{literal}': {reason}")]
    InvalidAddress { literal: String, reason: String },

    #[error(
        "no routing domain relation for gateway group '{gateway_group}' \
         (fabric={fabric} tenant={tenant} external_network={external_network})"
    )]
    UnresolvedGatewayRelation {
        fabric: String,
        tenant: String,
        gateway_group: String,
        external_network: String,
    },

    #[error(
        "gateway group '{gateway_group}' points to routing domain '{routing_domain}' which doesn't exist \
         (fabric={fabric} tenant={tenant} external_network={external_network})"
    )]
    UnknownRoutingDomain {
        fabric: String,
        tenant: String,
        routing_domain: String,
        gateway_group: String,
        external_network: String,
    },
}

/// Failures surfaced by a fabric client. Any of them abandons that fabric.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("authentication failed for {fabric}: {reason}")]
    AuthenticationFailed { fabric: String, reason: String },

    #[error("transport error talking to {fabric}: {reason}")]
    TransportError { fabric: String, reason: String },

    #[error("malformed record from {fabric}: {reason}")]
    MalformedRecord { fabric: String, reason: String },
}

impl ClientError {
    /// The fabric this error belongs to.
    pub fn fabric(&self) -> &str {
        match self {
            ClientError::AuthenticationFailed { fabric, .. }
            | ClientError::TransportError { fabric, .. }
            | ClientError::MalformedRecord { fabric, .. } => fabric,
        }
    }
}
