//! Process-local store implementing every persistence port.
//!
//! Used by the test suites and for local experimentation. All state sits
//! behind one `RwLock`; each mutating operation runs inside a single write
//! guard with no await point, so conditional updates are linearizable.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::authorization::models::ScopePredicate;
use crate::domain::errors::StoreError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::PasswordState;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::ids::AssetId;
use crate::domain::ids::CustomerId;
use crate::domain::ids::IdentityId;
use crate::domain::ids::InvitationId;
use crate::domain::ids::ServiceProviderId;
use crate::domain::ids::SiteId;
use crate::domain::ids::WorkOrderId;
use crate::domain::invitation::models::Invitation;
use crate::domain::invitation::ports::InvitationRepository;
use crate::domain::report::models::ReportEntry;
use crate::domain::report::models::ReportHeader;
use crate::domain::report::ports::ReportRepository;
use crate::domain::tenancy::Asset;
use crate::domain::tenancy::Customer;
use crate::domain::tenancy::ServiceProvider;
use crate::domain::tenancy::Site;
use crate::domain::work_order::models::MutationOutcome;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderStatus;
use crate::domain::work_order::ports::WorkOrderRepository;

#[derive(Default)]
struct State {
    providers: HashMap<ServiceProviderId, ServiceProvider>,
    customers: HashMap<CustomerId, Customer>,
    sites: HashMap<SiteId, Site>,
    assets: HashMap<AssetId, Asset>,
    identities: HashMap<IdentityId, Identity>,
    invitations: HashMap<InvitationId, Invitation>,
    work_orders: HashMap<WorkOrderId, WorkOrder>,
}

impl State {
    fn admitted(&self, scope: &ScopePredicate, id: &WorkOrderId) -> Option<&WorkOrder> {
        self.work_orders
            .get(id)
            .filter(|wo| scope.admits(wo.service_provider_id, wo.customer_id, wo.assigned_to))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_provider(&self, provider: ServiceProvider) {
        self.state.write().await.providers.insert(provider.id, provider);
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.state.write().await.customers.insert(customer.id, customer);
    }

    pub async fn insert_site(&self, site: Site) {
        self.state.write().await.sites.insert(site.id, site);
    }

    pub async fn insert_asset(&self, asset: Asset) {
        self.state.write().await.assets.insert(asset.id, asset);
    }

    /// Insert or replace an identity without uniqueness checks.
    pub async fn insert_identity(&self, identity: Identity) -> Identity {
        self.state
            .write()
            .await
            .identities
            .insert(identity.id, identity.clone());
        identity
    }

    pub async fn insert_work_order(&self, work_order: WorkOrder) -> WorkOrder {
        self.state
            .write()
            .await
            .work_orders
            .insert(work_order.id, work_order.clone());
        work_order
    }

    pub async fn identity(&self, id: &IdentityId) -> Option<Identity> {
        self.state.read().await.identities.get(id).cloned()
    }

    pub async fn invitation(&self, id: &InvitationId) -> Option<Invitation> {
        self.state.read().await.invitations.get(id).cloned()
    }

    pub async fn work_order(&self, id: &WorkOrderId) -> Option<WorkOrder> {
        self.state.read().await.work_orders.get(id).cloned()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryStore {
    async fn find_by_tenant_and_email(
        &self,
        service_provider_id: &ServiceProviderId,
        email: &EmailAddress,
    ) -> Result<Option<Identity>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.service_provider_id == *service_provider_id && i.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, StoreError> {
        Ok(self.identity(id).await)
    }

    async fn create(&self, identity: Identity) -> Result<Identity, StoreError> {
        let mut state = self.state.write().await;
        let duplicate = state.identities.values().any(|i| {
            i.service_provider_id == identity.service_provider_id && i.email == identity.email
        });
        if duplicate || state.identities.contains_key(&identity.id) {
            return Err(StoreError::UniqueViolation(
                "identities_service_provider_id_email_key".to_string(),
            ));
        }

        state.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update_password(
        &self,
        id: &IdentityId,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.identities.get_mut(id) {
            Some(identity) => {
                identity.password = PasswordState::from_stored(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_active(
        &self,
        service_provider_id: &ServiceProviderId,
        id: &IdentityId,
        active: bool,
    ) -> Result<Option<Identity>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state
            .identities
            .get_mut(id)
            .filter(|i| i.service_provider_id == *service_provider_id)
            .map(|identity| {
                identity.active = active;
                identity.clone()
            }))
    }

    async fn customer_in_provider(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .customers
            .get(customer_id)
            .is_some_and(|c| c.service_provider_id == *service_provider_id))
    }
}

#[async_trait]
impl InvitationRepository for InMemoryStore {
    async fn create(&self, invitation: Invitation) -> Result<Invitation, StoreError> {
        let mut state = self.state.write().await;
        if state.invitations.contains_key(&invitation.id) {
            return Err(StoreError::UniqueViolation("invitations_pkey".to_string()));
        }
        state.invitations.insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    async fn find_usable_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .invitations
            .values()
            .find(|i| i.token_hash == token_hash && i.is_usable_at(now))
            .cloned())
    }

    async fn consume(
        &self,
        invitation_id: &InvitationId,
        identity_id: &IdentityId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;

        let usable = state
            .invitations
            .get(invitation_id)
            .is_some_and(|i| i.identity_id == *identity_id && i.is_usable_at(now));
        if !usable || !state.identities.contains_key(identity_id) {
            return Ok(false);
        }

        if let Some(invitation) = state.invitations.get_mut(invitation_id) {
            invitation.consumed_at = Some(now);
        }
        if let Some(identity) = state.identities.get_mut(identity_id) {
            identity.password = PasswordState::from_stored(password_hash.to_string());
        }
        Ok(true)
    }
}

#[async_trait]
impl WorkOrderRepository for InMemoryStore {
    async fn list(
        &self,
        scope: &ScopePredicate,
        filter: &WorkOrderFilter,
    ) -> Result<Vec<WorkOrder>, StoreError> {
        let state = self.state.read().await;
        let mut visible: Vec<&WorkOrder> = state
            .work_orders
            .values()
            .filter(|wo| scope.admits(wo.service_provider_id, wo.customer_id, wo.assigned_to))
            .filter(|wo| filter.status.map_or(true, |s| s == wo.status))
            .collect();
        visible.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.0.cmp(&a.id.0))
        });

        Ok(visible
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn create(&self, work_order: WorkOrder) -> Result<WorkOrder, StoreError> {
        let mut state = self.state.write().await;
        if state.work_orders.contains_key(&work_order.id) {
            return Err(StoreError::UniqueViolation("work_orders_pkey".to_string()));
        }
        state.work_orders.insert(work_order.id, work_order.clone());
        Ok(work_order)
    }

    async fn check_ownership(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
        site_id: &SiteId,
        asset_id: &AssetId,
    ) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        let customer_ok = state
            .customers
            .get(customer_id)
            .is_some_and(|c| c.service_provider_id == *service_provider_id);
        let site_ok = state
            .sites
            .get(site_id)
            .is_some_and(|s| s.customer_id == *customer_id);
        let asset_ok = state
            .assets
            .get(asset_id)
            .is_some_and(|a| a.customer_id == *customer_id && a.site_id == *site_id);

        Ok(customer_ok && site_ok && asset_ok)
    }

    async fn complete(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        notes: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<MutationOutcome, StoreError> {
        let mut state = self.state.write().await;
        let status = match state.admitted(scope, id) {
            Some(wo) => wo.status,
            None => return Ok(MutationOutcome::NotFound),
        };
        if status == WorkOrderStatus::Cancelled {
            return Ok(MutationOutcome::Rejected(status));
        }

        Ok(match state.work_orders.get_mut(id) {
            Some(wo) => {
                wo.status = WorkOrderStatus::Completed;
                wo.completed_at = wo.completed_at.or(Some(completed_at));
                if notes.is_some() {
                    wo.notes = notes;
                }
                MutationOutcome::Applied(wo.clone())
            }
            None => MutationOutcome::NotFound,
        })
    }

    async fn assign(
        &self,
        scope: &ScopePredicate,
        id: &WorkOrderId,
        technician_id: &IdentityId,
    ) -> Result<MutationOutcome, StoreError> {
        let mut state = self.state.write().await;
        let status = match state.admitted(scope, id) {
            Some(wo) => wo.status,
            None => return Ok(MutationOutcome::NotFound),
        };
        if status != WorkOrderStatus::Open {
            return Ok(MutationOutcome::Rejected(status));
        }

        Ok(match state.work_orders.get_mut(id) {
            Some(wo) => {
                wo.assigned_to = Some(*technician_id);
                MutationOutcome::Applied(wo.clone())
            }
            None => MutationOutcome::NotFound,
        })
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn report_header(
        &self,
        service_provider_id: &ServiceProviderId,
        customer_id: &CustomerId,
    ) -> Result<Option<ReportHeader>, StoreError> {
        let state = self.state.read().await;
        let provider = state.providers.get(service_provider_id);
        let customer = state
            .customers
            .get(customer_id)
            .filter(|c| c.service_provider_id == *service_provider_id);

        Ok(provider.zip(customer).map(|(p, c)| ReportHeader {
            service_provider_name: p.name.clone(),
            customer_name: c.name.clone(),
        }))
    }

    async fn completed_in_window(
        &self,
        scope: &ScopePredicate,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReportEntry>, StoreError> {
        let state = self.state.read().await;
        let mut entries: Vec<ReportEntry> = state
            .work_orders
            .values()
            .filter(|wo| wo.status == WorkOrderStatus::Completed)
            .filter(|wo| scope.admits(wo.service_provider_id, wo.customer_id, wo.assigned_to))
            .filter_map(|wo| {
                let completed_at = wo.completed_at.filter(|at| *at >= from && *at < to)?;
                let site = state.sites.get(&wo.site_id)?;
                let asset = state.assets.get(&wo.asset_id)?;
                Some(ReportEntry {
                    work_order_id: wo.id,
                    completed_at,
                    site_name: site.name.clone(),
                    asset_tag: asset.tag_code.clone(),
                    asset_name: asset.name.clone(),
                    work_order_type: wo.work_order_type,
                    priority: wo.priority,
                    title: wo.title.clone(),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            a.completed_at
                .cmp(&b.completed_at)
                .then_with(|| a.work_order_id.0.cmp(&b.work_order_id.0))
        });

        Ok(entries)
    }
}
