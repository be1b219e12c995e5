use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::authorization::models::AccessRequest;
use crate::domain::authorization::models::Operation;
use crate::domain::authorization::models::Resource;
use crate::domain::authorization::AuthorizationEngine;
use crate::domain::identity::context::IdentityContext;
use crate::domain::identity::models::Role;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::ids::IdentityId;
use crate::domain::ids::WorkOrderId;
use crate::domain::work_order::errors::WorkOrderError;
use crate::domain::work_order::models::trimmed;
use crate::domain::work_order::models::CreateWorkOrderCommand;
use crate::domain::work_order::models::ListWorkOrdersQuery;
use crate::domain::work_order::models::MutationOutcome;
use crate::domain::work_order::models::WorkOrder;
use crate::domain::work_order::models::WorkOrderFilter;
use crate::domain::work_order::models::WorkOrderStatus;
use crate::domain::work_order::ports::WorkOrderRepository;
use crate::domain::work_order::ports::WorkOrderServicePort;

const MAX_TITLE_LENGTH: usize = 200;

pub struct WorkOrderService<WR, IR>
where
    WR: WorkOrderRepository,
    IR: IdentityRepository,
{
    repository: Arc<WR>,
    identities: Arc<IR>,
    engine: AuthorizationEngine,
}

impl<WR, IR> WorkOrderService<WR, IR>
where
    WR: WorkOrderRepository,
    IR: IdentityRepository,
{
    pub fn new(repository: Arc<WR>, identities: Arc<IR>) -> Self {
        Self {
            repository,
            identities,
            engine: AuthorizationEngine::new(),
        }
    }

    /// Require an active technician of the caller's provider.
    async fn ensure_technician(
        &self,
        ctx: &IdentityContext,
        technician_id: &IdentityId,
    ) -> Result<(), WorkOrderError> {
        let eligible = self
            .identities
            .find_by_id(technician_id)
            .await?
            .map_or(false, |identity| {
                identity.service_provider_id == ctx.service_provider_id()
                    && identity.role == Role::Technician
                    && identity.active
            });

        if eligible {
            Ok(())
        } else {
            Err(WorkOrderError::Validation(
                "assigned_to must be an active technician of this provider".to_string(),
            ))
        }
    }

    fn applied(outcome: MutationOutcome, id: &WorkOrderId) -> Result<WorkOrder, WorkOrderError> {
        match outcome {
            MutationOutcome::Applied(work_order) => Ok(work_order),
            MutationOutcome::Rejected(status) => Err(WorkOrderError::Conflict(format!(
                "work order is {}",
                status
            ))),
            MutationOutcome::NotFound => Err(WorkOrderError::NotFound(id.to_string())),
        }
    }
}

#[async_trait]
impl<WR, IR> WorkOrderServicePort for WorkOrderService<WR, IR>
where
    WR: WorkOrderRepository,
    IR: IdentityRepository,
{
    async fn list_work_orders(
        &self,
        ctx: &IdentityContext,
        query: ListWorkOrdersQuery,
    ) -> Result<Vec<WorkOrder>, WorkOrderError> {
        let request = AccessRequest::new(Resource::WorkOrder, Operation::Read)
            .for_customer(query.customer_id);
        let scope = self.engine.authorize(ctx, &request)?;

        let filter = WorkOrderFilter::from_query(&query);
        Ok(self.repository.list(&scope, &filter).await?)
    }

    async fn create_work_order(
        &self,
        ctx: &IdentityContext,
        command: CreateWorkOrderCommand,
    ) -> Result<WorkOrder, WorkOrderError> {
        let request = AccessRequest::new(Resource::WorkOrder, Operation::Create)
            .for_customer(command.customer_id);
        let scope = self.engine.authorize(ctx, &request)?;

        let (Some(customer_id), Some(site_id), Some(asset_id)) =
            (scope.customer_id(), command.site_id, command.asset_id)
        else {
            return Err(WorkOrderError::Validation(
                "customer_id, site_id and asset_id are required".to_string(),
            ));
        };

        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(WorkOrderError::Validation("title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(WorkOrderError::Validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }

        let owned = self
            .repository
            .check_ownership(
                &scope.service_provider_id(),
                &customer_id,
                &site_id,
                &asset_id,
            )
            .await?;
        if !owned {
            return Err(WorkOrderError::Validation(
                "invalid customer/site/asset for this provider".to_string(),
            ));
        }

        if let Some(technician_id) = &command.assigned_to {
            self.ensure_technician(ctx, technician_id).await?;
        }

        let work_order = WorkOrder {
            id: WorkOrderId::new(),
            service_provider_id: scope.service_provider_id(),
            customer_id,
            site_id,
            asset_id,
            work_order_type: command.work_order_type.unwrap_or_default(),
            priority: command.priority.unwrap_or_default(),
            status: WorkOrderStatus::Open,
            title,
            description: trimmed(command.description),
            notes: trimmed(command.notes),
            assigned_to: command.assigned_to,
            created_by: ctx.user_id(),
            completed_at: None,
            created_at: Utc::now(),
        };

        let created = self.repository.create(work_order).await?;
        tracing::info!(
            work_order_id = %created.id,
            customer_id = %created.customer_id,
            created_by = %ctx.user_id(),
            "Work order created"
        );

        Ok(created)
    }

    async fn complete_work_order(
        &self,
        ctx: &IdentityContext,
        id: &WorkOrderId,
        notes: Option<String>,
    ) -> Result<WorkOrder, WorkOrderError> {
        let request = AccessRequest::new(Resource::WorkOrder, Operation::Complete);
        let scope = self.engine.authorize(ctx, &request)?;

        let outcome = self
            .repository
            .complete(&scope, id, trimmed(notes), Utc::now())
            .await?;
        let completed = Self::applied(outcome, id)?;

        tracing::info!(
            work_order_id = %completed.id,
            completed_by = %ctx.user_id(),
            "Work order completed"
        );

        Ok(completed)
    }

    async fn assign_work_order(
        &self,
        ctx: &IdentityContext,
        id: &WorkOrderId,
        technician_id: &IdentityId,
    ) -> Result<WorkOrder, WorkOrderError> {
        let request = AccessRequest::new(Resource::WorkOrder, Operation::Assign);
        let scope = self.engine.authorize(ctx, &request)?;

        self.ensure_technician(ctx, technician_id).await?;

        let outcome = self.repository.assign(&scope, id, technician_id).await?;
        let assigned = Self::applied(outcome, id)?;

        tracing::info!(
            work_order_id = %assigned.id,
            assigned_to = %technician_id,
            assigned_by = %ctx.user_id(),
            "Work order assigned"
        );

        Ok(assigned)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::domain::authorization::errors::AuthorizationError;
    use crate::domain::authorization::models::ScopePredicate;
    use crate::domain::errors::StoreError;
    use crate::domain::identity::models::EmailAddress;
    use crate::domain::identity::models::FullName;
    use crate::domain::identity::models::Identity;
    use crate::domain::identity::models::NewIdentity;
    use crate::domain::ids::AssetId;
    use crate::domain::ids::CustomerId;
    use crate::domain::ids::ServiceProviderId;
    use crate::domain::ids::SiteId;
    use crate::domain::tenancy::Asset;
    use crate::domain::tenancy::Customer;
    use crate::domain::tenancy::Site;
    use crate::domain::work_order::models::Priority;
    use crate::domain::work_order::models::WorkOrderType;
    use crate::outbound::repositories::memory::InMemoryStore;

    mock! {
        pub TestWorkOrderRepository {}

        #[async_trait]
        impl WorkOrderRepository for TestWorkOrderRepository {
            async fn list(&self, scope: &ScopePredicate, filter: &WorkOrderFilter) -> Result<Vec<WorkOrder>, StoreError>;
            async fn create(&self, work_order: WorkOrder) -> Result<WorkOrder, StoreError>;
            async fn check_ownership(&self, service_provider_id: &ServiceProviderId, customer_id: &CustomerId, site_id: &SiteId, asset_id: &AssetId) -> Result<bool, StoreError>;
            async fn complete(&self, scope: &ScopePredicate, id: &WorkOrderId, notes: Option<String>, completed_at: chrono::DateTime<Utc>) -> Result<MutationOutcome, StoreError>;
            async fn assign(&self, scope: &ScopePredicate, id: &WorkOrderId, technician_id: &IdentityId) -> Result<MutationOutcome, StoreError>;
        }
    }

    struct Tenant {
        provider: ServiceProviderId,
        customer: CustomerId,
        site: SiteId,
        asset: AssetId,
    }

    struct Fixture {
        store: Arc<InMemoryStore>,
        p1: Tenant,
        c2: Tenant,
        technician: Identity,
        other_technician: Identity,
    }

    async fn seed_tenant(
        store: &InMemoryStore,
        provider: ServiceProviderId,
        name: &str,
    ) -> Tenant {
        let customer = CustomerId::new();
        let site = SiteId::new();
        let asset = AssetId::new();
        store
            .insert_customer(Customer {
                id: customer,
                service_provider_id: provider,
                name: name.to_string(),
            })
            .await;
        store
            .insert_site(Site {
                id: site,
                customer_id: customer,
                name: format!("{} HQ", name),
            })
            .await;
        store
            .insert_asset(Asset {
                id: asset,
                customer_id: customer,
                site_id: site,
                tag_code: "CH-01".to_string(),
                name: Some("Chiller".to_string()),
            })
            .await;
        Tenant {
            provider,
            customer,
            site,
            asset,
        }
    }

    async fn seed_technician(store: &InMemoryStore, provider: ServiceProviderId) -> Identity {
        store
            .insert_identity(Identity::pending(
                provider,
                NewIdentity {
                    role: Role::Technician,
                    customer_id: None,
                    full_name: FullName::new("Tech").unwrap(),
                    email: EmailAddress::new(&format!("{}@example.com", IdentityId::new()))
                        .unwrap(),
                    phone_number: None,
                },
            ))
            .await
    }

    impl Fixture {
        async fn new() -> Self {
            let store = Arc::new(InMemoryStore::new());
            let provider = ServiceProviderId::new();
            let p1 = seed_tenant(&store, provider, "Acme").await;
            let c2 = seed_tenant(&store, provider, "Globex").await;
            let technician = seed_technician(&store, provider).await;
            let other_technician = seed_technician(&store, provider).await;
            Self {
                store,
                p1,
                c2,
                technician,
                other_technician,
            }
        }

        fn service(&self) -> WorkOrderService<InMemoryStore, InMemoryStore> {
            WorkOrderService::new(Arc::clone(&self.store), Arc::clone(&self.store))
        }

        fn ctx(&self, role: Role) -> IdentityContext {
            let customer = role.requires_customer().then_some(self.p1.customer);
            IdentityContext::for_tests(self.p1.provider, role, customer)
        }

        fn technician_ctx(&self) -> IdentityContext {
            IdentityContext::for_tests_as(
                self.technician.id,
                self.p1.provider,
                Role::Technician,
                None,
            )
        }

        async fn work_order(
            &self,
            tenant: &Tenant,
            assigned_to: Option<IdentityId>,
            status: WorkOrderStatus,
        ) -> WorkOrder {
            self.store
                .insert_work_order(WorkOrder {
                    id: WorkOrderId::new(),
                    service_provider_id: tenant.provider,
                    customer_id: tenant.customer,
                    site_id: tenant.site,
                    asset_id: tenant.asset,
                    work_order_type: WorkOrderType::Corrective,
                    priority: Priority::Medium,
                    status,
                    title: "Inspect chiller".to_string(),
                    description: None,
                    notes: None,
                    assigned_to,
                    created_by: IdentityId::new(),
                    completed_at: None,
                    created_at: Utc::now(),
                })
                .await
        }

        fn create_command(&self, tenant: &Tenant) -> CreateWorkOrderCommand {
            CreateWorkOrderCommand {
                customer_id: Some(tenant.customer),
                site_id: Some(tenant.site),
                asset_id: Some(tenant.asset),
                title: "  Replace filter ".to_string(),
                ..Default::default()
            }
        }
    }

    #[tokio::test]
    async fn test_technician_customer_filter_is_ignored() {
        let fixture = Fixture::new().await;
        let mine = fixture
            .work_order(&fixture.p1, Some(fixture.technician.id), WorkOrderStatus::Open)
            .await;
        fixture
            .work_order(&fixture.c2, Some(fixture.other_technician.id), WorkOrderStatus::Open)
            .await;
        fixture
            .work_order(&fixture.c2, None, WorkOrderStatus::Open)
            .await;

        let listed = fixture
            .service()
            .list_work_orders(
                &fixture.technician_ctx(),
                ListWorkOrdersQuery {
                    customer_id: Some(fixture.c2.customer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(listed
            .iter()
            .all(|wo| wo.assigned_to == Some(fixture.technician.id)));
    }

    #[tokio::test]
    async fn test_client_sees_only_own_customer() {
        let fixture = Fixture::new().await;
        let own = fixture
            .work_order(&fixture.p1, None, WorkOrderStatus::Open)
            .await;
        fixture
            .work_order(&fixture.c2, None, WorkOrderStatus::Open)
            .await;
        let service = fixture.service();
        let client = fixture.ctx(Role::Client);

        let listed = service
            .list_work_orders(&client, ListWorkOrdersQuery::default())
            .await
            .unwrap();
        assert_eq!(listed.iter().map(|wo| wo.id).collect::<Vec<_>>(), vec![own.id]);

        let override_attempt = service
            .list_work_orders(
                &client,
                ListWorkOrdersQuery {
                    customer_id: Some(fixture.c2.customer),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            override_attempt,
            Err(WorkOrderError::Authorization(AuthorizationError::Denied))
        ));
    }

    #[tokio::test]
    async fn test_staff_list_filters_and_pages() {
        let fixture = Fixture::new().await;
        for _ in 0..3 {
            fixture
                .work_order(&fixture.p1, None, WorkOrderStatus::Open)
                .await;
        }
        fixture
            .work_order(&fixture.p1, None, WorkOrderStatus::Completed)
            .await;
        fixture
            .work_order(&fixture.c2, None, WorkOrderStatus::Open)
            .await;
        let service = fixture.service();
        let dispatcher = fixture.ctx(Role::Dispatcher);

        let all = service
            .list_work_orders(&dispatcher, ListWorkOrdersQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 5);

        let open_p1 = service
            .list_work_orders(
                &dispatcher,
                ListWorkOrdersQuery {
                    customer_id: Some(fixture.p1.customer),
                    status: Some(WorkOrderStatus::Open),
                    limit: Some(2),
                    offset: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(open_p1.len(), 2);
        assert!(open_p1
            .iter()
            .all(|wo| wo.customer_id == fixture.p1.customer && wo.status == WorkOrderStatus::Open));
    }

    #[tokio::test]
    async fn test_create_work_order_with_defaults() {
        let fixture = Fixture::new().await;
        let admin = fixture.ctx(Role::Admin);
        let mut command = fixture.create_command(&fixture.p1);
        command.assigned_to = Some(fixture.technician.id);

        let created = fixture
            .service()
            .create_work_order(&admin, command)
            .await
            .unwrap();

        assert_eq!(created.title, "Replace filter");
        assert_eq!(created.status, WorkOrderStatus::Open);
        assert_eq!(created.work_order_type, WorkOrderType::Corrective);
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.created_by, admin.user_id());
        assert_eq!(created.assigned_to, Some(fixture.technician.id));
        assert!(fixture.store.work_order(&created.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_broken_ownership_chain() {
        let fixture = Fixture::new().await;
        let mut command = fixture.create_command(&fixture.p1);
        command.site_id = Some(fixture.c2.site);

        let result = fixture
            .service()
            .create_work_order(&fixture.ctx(Role::Dispatcher), command)
            .await;

        assert!(matches!(result, Err(WorkOrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_provider_customer() {
        let fixture = Fixture::new().await;
        let foreign = seed_tenant(&fixture.store, ServiceProviderId::new(), "Initech").await;

        let result = fixture
            .service()
            .create_work_order(&fixture.ctx(Role::Admin), fixture.create_command(&foreign))
            .await;

        assert!(matches!(result, Err(WorkOrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requires_customer_and_staff_role() {
        let fixture = Fixture::new().await;
        let service = fixture.service();

        let mut command = fixture.create_command(&fixture.p1);
        command.customer_id = None;
        let missing = service
            .create_work_order(&fixture.ctx(Role::Admin), command)
            .await;
        assert!(matches!(
            missing,
            Err(WorkOrderError::Authorization(AuthorizationError::Validation(_)))
        ));

        let technician = service
            .create_work_order(&fixture.technician_ctx(), fixture.create_command(&fixture.p1))
            .await;
        assert!(matches!(
            technician,
            Err(WorkOrderError::Authorization(AuthorizationError::Denied))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_non_technician_assignee() {
        let fixture = Fixture::new().await;
        let foreign_technician = seed_technician(&fixture.store, ServiceProviderId::new()).await;
        let mut command = fixture.create_command(&fixture.p1);
        command.assigned_to = Some(foreign_technician.id);

        let result = fixture
            .service()
            .create_work_order(&fixture.ctx(Role::Admin), command)
            .await;

        assert!(matches!(result, Err(WorkOrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_complete_rules() {
        let fixture = Fixture::new().await;
        let service = fixture.service();
        let mine = fixture
            .work_order(&fixture.p1, Some(fixture.technician.id), WorkOrderStatus::Open)
            .await;
        let theirs = fixture
            .work_order(&fixture.p1, Some(fixture.other_technician.id), WorkOrderStatus::Open)
            .await;
        let cancelled = fixture
            .work_order(&fixture.p1, None, WorkOrderStatus::Cancelled)
            .await;

        let completed = service
            .complete_work_order(
                &fixture.technician_ctx(),
                &mine.id,
                Some(" replaced belt ".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(completed.status, WorkOrderStatus::Completed);
        assert_eq!(completed.notes.as_deref(), Some("replaced belt"));
        assert!(completed.completed_at.is_some());

        let not_assigned = service
            .complete_work_order(&fixture.technician_ctx(), &theirs.id, None)
            .await;
        assert!(matches!(not_assigned, Err(WorkOrderError::NotFound(_))));

        for role in [Role::Admin, Role::Dispatcher] {
            let result = service
                .complete_work_order(&fixture.ctx(role), &cancelled.id, None)
                .await;
            assert!(matches!(result, Err(WorkOrderError::Conflict(_))));
        }

        let client = service
            .complete_work_order(&fixture.ctx(Role::Client), &theirs.id, None)
            .await;
        assert!(matches!(
            client,
            Err(WorkOrderError::Authorization(AuthorizationError::Denied))
        ));
    }

    #[tokio::test]
    async fn test_complete_outside_provider_is_not_found() {
        let fixture = Fixture::new().await;
        let foreign = seed_tenant(&fixture.store, ServiceProviderId::new(), "Initech").await;
        let work_order = fixture
            .work_order(&foreign, None, WorkOrderStatus::Open)
            .await;

        let result = fixture
            .service()
            .complete_work_order(&fixture.ctx(Role::Admin), &work_order.id, None)
            .await;

        assert!(matches!(result, Err(WorkOrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_assign_rules() {
        let fixture = Fixture::new().await;
        let service = fixture.service();
        let open = fixture
            .work_order(&fixture.p1, None, WorkOrderStatus::Open)
            .await;
        let cancelled = fixture
            .work_order(&fixture.p1, None, WorkOrderStatus::Cancelled)
            .await;

        let assigned = service
            .assign_work_order(&fixture.ctx(Role::Dispatcher), &open.id, &fixture.technician.id)
            .await
            .unwrap();
        assert_eq!(assigned.assigned_to, Some(fixture.technician.id));

        let conflict = service
            .assign_work_order(&fixture.ctx(Role::Admin), &cancelled.id, &fixture.technician.id)
            .await;
        assert!(matches!(conflict, Err(WorkOrderError::Conflict(_))));

        let denied = service
            .assign_work_order(&fixture.technician_ctx(), &open.id, &fixture.technician.id)
            .await;
        assert!(matches!(
            denied,
            Err(WorkOrderError::Authorization(AuthorizationError::Denied))
        ));

        let mut inactive = fixture.other_technician.clone();
        inactive.active = false;
        fixture.store.insert_identity(inactive.clone()).await;
        let invalid = service
            .assign_work_order(&fixture.ctx(Role::Admin), &open.id, &inactive.id)
            .await;
        assert!(matches!(invalid, Err(WorkOrderError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_timeout_propagates() {
        let fixture = Fixture::new().await;
        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_list()
            .times(1)
            .returning(|_, _| Err(StoreError::Timeout));
        let service = WorkOrderService::new(Arc::new(repository), Arc::clone(&fixture.store));

        let result = service
            .list_work_orders(&fixture.ctx(Role::Admin), ListWorkOrdersQuery::default())
            .await;

        assert!(matches!(result, Err(WorkOrderError::Store(StoreError::Timeout))));
    }

    #[tokio::test]
    async fn test_repository_receives_scope_verbatim() {
        let fixture = Fixture::new().await;
        let ctx = fixture.technician_ctx();
        let expected_provider = ctx.service_provider_id();
        let expected_assignee = ctx.user_id();

        let mut repository = MockTestWorkOrderRepository::new();
        repository
            .expect_complete()
            .withf(move |scope, _, _, at| {
                scope.service_provider_id() == expected_provider
                    && scope.assignee() == Some(expected_assignee)
                    && scope.customer_id().is_none()
                    && *at > Utc::now() - Duration::minutes(1)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(MutationOutcome::NotFound));
        let service = WorkOrderService::new(Arc::new(repository), Arc::clone(&fixture.store));

        let result = service
            .complete_work_order(&ctx, &WorkOrderId::new(), None)
            .await;
        assert!(matches!(result, Err(WorkOrderError::NotFound(_))));
    }
}
