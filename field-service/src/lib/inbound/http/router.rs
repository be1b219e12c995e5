use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::assign_work_order::assign_work_order;
use super::handlers::complete_work_order::complete_work_order;
use super::handlers::create_user::create_user;
use super::handlers::create_work_order::create_work_order;
use super::handlers::list_work_orders::list_work_orders;
use super::handlers::login::login;
use super::handlers::me::me;
use super::handlers::monthly_report::monthly_report;
use super::handlers::reinvite_user::reinvite_user;
use super::handlers::set_password::set_password;
use super::handlers::set_user_active::set_user_active;
use super::middleware::resolve_identity;
use crate::domain::authentication::credentials::Credentials;
use crate::domain::authentication::ports::AuthenticationServicePort;
use crate::domain::authentication::service::AuthenticationService;
use crate::domain::identity::ports::IdentityRepository;
use crate::domain::identity::ports::IdentityServicePort;
use crate::domain::identity::service::IdentityService;
use crate::domain::invitation::ports::InvitationDelivery;
use crate::domain::invitation::ports::InvitationRepository;
use crate::domain::invitation::ports::InvitationServicePort;
use crate::domain::invitation::InvitationManager;
use crate::domain::report::ports::ReportRepository;
use crate::domain::report::ports::ReportServicePort;
use crate::domain::report::service::ReportService;
use crate::domain::work_order::ports::WorkOrderRepository;
use crate::domain::work_order::ports::WorkOrderServicePort;
use crate::domain::work_order::service::WorkOrderService;

#[derive(Clone)]
pub struct AppState {
    pub authentication_service: Arc<dyn AuthenticationServicePort>,
    pub identity_service: Arc<dyn IdentityServicePort>,
    pub invitation_service: Arc<dyn InvitationServicePort>,
    pub work_order_service: Arc<dyn WorkOrderServicePort>,
    pub report_service: Arc<dyn ReportServicePort>,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Wire the domain services over a set of store adapters.
    ///
    /// # Arguments
    /// * `identities` / `invitations` / `work_orders` / `reports` - Store adapters
    /// * `delivery` - Channel that hands invitation tokens to invitees
    /// * `authenticator` - Signing key and password hasher
    /// * `max_concurrent_hashes` - Bound on simultaneous password hash operations
    pub fn new<IR, VR, WR, RR>(
        identities: Arc<IR>,
        invitations: Arc<VR>,
        work_orders: Arc<WR>,
        reports: Arc<RR>,
        delivery: Arc<dyn InvitationDelivery>,
        authenticator: Arc<Authenticator>,
        max_concurrent_hashes: usize,
    ) -> Self
    where
        IR: IdentityRepository,
        VR: InvitationRepository,
        WR: WorkOrderRepository,
        RR: ReportRepository,
    {
        let credentials = Credentials::new(Arc::clone(&authenticator), max_concurrent_hashes);
        let invitation_manager = Arc::new(InvitationManager::new(
            Arc::clone(&identities),
            invitations,
            credentials.clone(),
        ));

        Self {
            authentication_service: Arc::new(AuthenticationService::new(
                Arc::clone(&identities),
                credentials,
            )),
            identity_service: Arc::new(IdentityService::new(
                Arc::clone(&identities),
                Arc::clone(&invitation_manager),
                delivery,
            )),
            invitation_service: invitation_manager,
            work_order_service: Arc::new(WorkOrderService::new(work_orders, identities)),
            report_service: Arc::new(ReportService::new(reports)),
            authenticator,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/set-password", post(set_password));

    let protected_routes = Router::new()
        .route("/api/me", get(me))
        .route("/api/users", post(create_user))
        .route("/api/users/:user_id/invitations", post(reinvite_user))
        .route("/api/users/:user_id/active", patch(set_user_active))
        .route(
            "/api/work-orders",
            get(list_work_orders).post(create_work_order),
        )
        .route("/api/work-orders/:id/complete", patch(complete_work_order))
        .route("/api/work-orders/:id/assign", patch(assign_work_order))
        .route("/api/reports/monthly", get(monthly_report))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_identity,
        ));

    // Headers are left out of the span; they carry bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
