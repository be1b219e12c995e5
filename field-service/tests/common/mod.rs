use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use auth::SessionClaims;
use chrono::DateTime;
use chrono::Utc;
use field_service::domain::identity::models::EmailAddress;
use field_service::domain::identity::models::FullName;
use field_service::domain::identity::models::Identity;
use field_service::domain::identity::models::PasswordState;
use field_service::domain::identity::models::Role;
use field_service::domain::ids::AssetId;
use field_service::domain::ids::CustomerId;
use field_service::domain::ids::IdentityId;
use field_service::domain::ids::ServiceProviderId;
use field_service::domain::ids::SiteId;
use field_service::domain::ids::WorkOrderId;
use field_service::domain::invitation::errors::DeliveryError;
use field_service::domain::invitation::models::InvitationNotice;
use field_service::domain::invitation::ports::InvitationDelivery;
use field_service::domain::tenancy::Asset;
use field_service::domain::tenancy::Customer;
use field_service::domain::tenancy::ServiceProvider;
use field_service::domain::tenancy::Site;
use field_service::domain::work_order::models::Priority;
use field_service::domain::work_order::models::WorkOrder;
use field_service::domain::work_order::models::WorkOrderStatus;
use field_service::domain::work_order::models::WorkOrderType;
use field_service::inbound::http::router::create_router;
use field_service::inbound::http::router::AppState;
use field_service::outbound::repositories::InMemoryStore;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "correct-horse-42";

/// Delivery double that keeps every notice so tests can read the token.
#[derive(Default)]
pub struct CapturingDelivery {
    notices: Mutex<Vec<InvitationNotice>>,
}

impl CapturingDelivery {
    pub fn last_token_for(&self, identity_id: &str) -> Option<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|n| n.identity_id.to_string() == identity_id)
            .map(|n| n.token.expose().to_string())
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

#[async_trait]
impl InvitationDelivery for CapturingDelivery {
    async fn deliver(&self, notice: &InvitationNotice) -> Result<(), DeliveryError> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

/// Customer with one site and one asset.
#[derive(Debug, Clone, Copy)]
pub struct TestCustomer {
    pub id: CustomerId,
    pub site: SiteId,
    pub asset: AssetId,
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub delivery: Arc<CapturingDelivery>,
    pub authenticator: Arc<Authenticator>,
    pub api_client: reqwest::Client,
    pub provider: ServiceProviderId,
    pub customer_a: TestCustomer,
    pub customer_b: TestCustomer,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let delivery = Arc::new(CapturingDelivery::default());

        // Cheap Argon2 parameters keep the suite fast.
        let hasher = PasswordHasher::with_cost(1024, 1, 1).expect("Failed to build hasher");
        let authenticator =
            Arc::new(Authenticator::new(TEST_SECRET, hasher).expect("Failed to build authenticator"));

        let provider = ServiceProviderId::new();
        store
            .insert_provider(ServiceProvider {
                id: provider,
                name: "Acme Field Services".to_string(),
            })
            .await;
        let customer_a = seed_customer(&store, provider, "Northwind").await;
        let customer_b = seed_customer(&store, provider, "Contoso").await;

        let state = AppState::new(
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&store),
            Arc::clone(&delivery) as Arc<dyn InvitationDelivery>,
            Arc::clone(&authenticator),
            4,
        );
        let router = create_router(state);

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            store,
            delivery,
            authenticator,
            api_client: reqwest::Client::builder()
                .build()
                .expect("Failed to create reqwest client"),
            provider,
            customer_a,
            customer_b,
        }
    }

    /// Insert an identity. `password` of `None` leaves it pending.
    pub async fn seed_user(
        &self,
        role: Role,
        customer: Option<CustomerId>,
        email: &str,
        password: Option<&str>,
    ) -> Identity {
        self.seed_user_in(self.provider, role, customer, email, password)
            .await
    }

    pub async fn seed_user_in(
        &self,
        provider: ServiceProviderId,
        role: Role,
        customer: Option<CustomerId>,
        email: &str,
        password: Option<&str>,
    ) -> Identity {
        let password = match password {
            Some(p) => PasswordState::Hashed(
                self.authenticator
                    .hash_password(p)
                    .expect("Failed to hash password"),
            ),
            None => PasswordState::Unset,
        };

        self.store
            .insert_identity(Identity {
                id: IdentityId::new(),
                service_provider_id: provider,
                customer_id: customer,
                full_name: FullName::new("Test User").unwrap(),
                email: EmailAddress::new(email).unwrap(),
                phone_number: None,
                role,
                active: true,
                password,
                created_at: Utc::now(),
            })
            .await
    }

    /// Issue a session token for an identity without going through login.
    pub fn token_for(&self, identity: &Identity) -> String {
        let claims = SessionClaims::for_identity(
            identity.id,
            identity.service_provider_id,
            identity.role.as_str(),
        )
        .with_customer(identity.customer_id);
        self.authenticator
            .generate_token(&claims)
            .expect("Failed to sign token")
    }

    pub async fn seed_work_order(
        &self,
        customer: &TestCustomer,
        created_by: &Identity,
        assigned_to: Option<IdentityId>,
        status: WorkOrderStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> WorkOrder {
        self.store
            .insert_work_order(WorkOrder {
                id: WorkOrderId::new(),
                service_provider_id: self.provider,
                customer_id: customer.id,
                site_id: customer.site,
                asset_id: customer.asset,
                work_order_type: WorkOrderType::Corrective,
                priority: Priority::Medium,
                status,
                title: "Replace filter".to_string(),
                description: None,
                notes: None,
                assigned_to,
                created_by: created_by.id,
                completed_at,
                created_at: Utc::now(),
            })
            .await
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(&format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/login")
            .json(&serde_json::json!({
                "service_provider_id": self.provider.to_string(),
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn set_password(&self, token: &str, password: &str) -> reqwest::Response {
        self.post("/api/auth/set-password")
            .json(&serde_json::json!({ "token": token, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

async fn seed_customer(
    store: &InMemoryStore,
    provider: ServiceProviderId,
    name: &str,
) -> TestCustomer {
    let customer = TestCustomer {
        id: CustomerId::new(),
        site: SiteId::new(),
        asset: AssetId::new(),
    };
    store
        .insert_customer(Customer {
            id: customer.id,
            service_provider_id: provider,
            name: name.to_string(),
        })
        .await;
    store
        .insert_site(Site {
            id: customer.site,
            customer_id: customer.id,
            name: format!("{} HQ", name),
        })
        .await;
    store
        .insert_asset(Asset {
            id: customer.asset,
            customer_id: customer.id,
            site_id: customer.site,
            tag_code: format!("{}-001", name.to_uppercase()),
            name: Some("Rooftop unit".to_string()),
        })
        .await;
    customer
}
