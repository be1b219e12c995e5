//! Tenancy catalog records.
//!
//! Owned by external CRUD; this service only reads them for ownership checks
//! and report headers.

use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::SiteId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceProvider {
    pub id: ServiceProviderId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: CustomerId,
    pub service_provider_id: ServiceProviderId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: SiteId,
    pub customer_id: CustomerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: AssetId,
    pub customer_id: CustomerId,
    pub site_id: SiteId,
    pub tag_code: String,
    pub name: Option<String>,
}
