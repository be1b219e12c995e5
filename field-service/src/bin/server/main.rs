use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use field_service::config::Config;
use field_service::domain::invitation::ports::InvitationDelivery;
use field_service::inbound::http::router::create_router;
use field_service::inbound::http::router::AppState;
use field_service::outbound::delivery::UnconfiguredDelivery;
use field_service::outbound::delivery::WebhookInvitationDelivery;
use field_service::outbound::repositories::PostgresIdentityRepository;
use field_service::outbound::repositories::PostgresInvitationRepository;
use field_service::outbound::repositories::PostgresReportRepository;
use field_service::outbound::repositories::PostgresWorkOrderRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "field_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "field-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        operation_timeout_ms = config.database.operation_timeout_ms,
        delivery_configured = config.delivery.webhook_url.is_some(),
        "Configuration loaded"
    );

    let operation_timeout = Duration::from_millis(config.database.operation_timeout_ms);
    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(operation_timeout)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let hashing = &config.password_hashing;
    let hasher =
        PasswordHasher::with_cost(hashing.memory_kib, hashing.iterations, hashing.parallelism)?;
    let authenticator = Arc::new(Authenticator::new(config.jwt.secret.as_bytes(), hasher)?);

    let delivery: Arc<dyn InvitationDelivery> = match &config.delivery.webhook_url {
        Some(url) => Arc::new(WebhookInvitationDelivery::new(
            url.as_str(),
            Duration::from_millis(config.delivery.timeout_ms),
        )?),
        None => {
            tracing::warn!("delivery.webhook_url not set; invitations will not be sent");
            Arc::new(UnconfiguredDelivery)
        }
    };

    let state = AppState::new(
        Arc::new(PostgresIdentityRepository::new(pg_pool.clone(), operation_timeout)),
        Arc::new(PostgresInvitationRepository::new(pg_pool.clone(), operation_timeout)),
        Arc::new(PostgresWorkOrderRepository::new(pg_pool.clone(), operation_timeout)),
        Arc::new(PostgresReportRepository::new(pg_pool, operation_timeout)),
        delivery,
        authenticator,
        hashing.max_concurrent,
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;

    tracing::info!("Server exited");
    Ok(())
}
