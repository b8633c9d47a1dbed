use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marketfeed_core::TenantId;

/// Credentials a tenant uses against the external marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCredentials {
    /// Merchant/seller identifier on the external system.
    pub seller_id: String,
    /// Delegated authorization token for API calls on the seller's behalf.
    pub auth_token: String,
}

/// A tenant: one seller account scoped to one set of inventory records
/// and one external credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub credentials: TenantCredentials,
    /// Timestamp of the last successful submission claim. Read by the
    /// throttle gate; advanced only through the store's conditional update.
    pub last_execution: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn new(name: impl Into<String>, credentials: TenantCredentials) -> Self {
        Self {
            id: TenantId::new(),
            name: name.into(),
            credentials,
            last_execution: None,
        }
    }
}
