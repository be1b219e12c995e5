use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::invitation::errors::DeliveryError;
use crate::domain::invitation::models::InvitationNotice;
use crate::domain::invitation::ports::InvitationDelivery;

/// Posts invitation notices as JSON to a mailer webhook.
///
/// The payload carries the plaintext token; the endpoint is trusted to send
/// it to the invitee and nowhere else.
pub struct WebhookInvitationDelivery {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookInvitationDelivery {
    /// Create a delivery client.
    ///
    /// # Arguments
    /// * `endpoint` - Mailer webhook URL
    /// * `timeout` - Upper bound for one delivery attempt
    ///
    /// # Errors
    /// * `Transport` - Endpoint is empty or the HTTP client could not be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(DeliveryError::Transport(
                "webhook endpoint must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

#[derive(Debug, Serialize)]
struct InvitationPayload<'a> {
    invitation_id: String,
    identity_id: String,
    service_provider_id: String,
    email: &'a str,
    full_name: &'a str,
    role: &'static str,
    token: &'a str,
    expires_at: DateTime<Utc>,
}

impl<'a> From<&'a InvitationNotice> for InvitationPayload<'a> {
    fn from(notice: &'a InvitationNotice) -> Self {
        Self {
            invitation_id: notice.invitation_id.to_string(),
            identity_id: notice.identity_id.to_string(),
            service_provider_id: notice.service_provider_id.to_string(),
            email: &notice.email,
            full_name: &notice.full_name,
            role: notice.role.as_str(),
            token: notice.token.expose(),
            expires_at: notice.expires_at,
        }
    }
}

fn classify(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else if let Some(status) = err.status() {
        DeliveryError::Rejected(format!("mailer responded with {}", status))
    } else {
        DeliveryError::Transport(err.to_string())
    }
}

#[async_trait]
impl InvitationDelivery for WebhookInvitationDelivery {
    async fn deliver(&self, notice: &InvitationNotice) -> Result<(), DeliveryError> {
        self.client
            .post(&self.endpoint)
            .json(&InvitationPayload::from(notice))
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;

        tracing::debug!(
            invitation_id = %notice.invitation_id,
            identity_id = %notice.identity_id,
            "Invitation handed to mailer"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use auth::InvitationToken;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Json;
    use axum::Router;
    use serde_json::Value;

    use super::*;
    use crate::domain::identity::models::Role;
    use crate::domain::ids::IdentityId;
    use crate::domain::ids::InvitationId;
    use crate::domain::ids::ServiceProviderId;

    type Captured = Arc<Mutex<Vec<Value>>>;

    async fn spawn_mailer(status: StatusCode, delay: Duration) -> (String, Captured) {
        let captured: Captured = Arc::default();
        let app = Router::new()
            .route(
                "/invitations",
                post(
                    move |State(captured): State<Captured>, Json(body): Json<Value>| async move {
                        tokio::time::sleep(delay).await;
                        captured.lock().unwrap().push(body);
                        status
                    },
                ),
            )
            .with_state(Arc::clone(&captured));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/invitations", address), captured)
    }

    fn notice(token: &InvitationToken) -> InvitationNotice {
        InvitationNotice {
            invitation_id: InvitationId::new(),
            identity_id: IdentityId::new(),
            service_provider_id: ServiceProviderId::new(),
            email: "tom@example.com".to_string(),
            full_name: "Tom Tech".to_string(),
            role: Role::Technician,
            token: token.clone(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_delivers_token_and_metadata() {
        let (endpoint, captured) = spawn_mailer(StatusCode::ACCEPTED, Duration::ZERO).await;
        let delivery = WebhookInvitationDelivery::new(endpoint, Duration::from_secs(5)).unwrap();
        let token = InvitationToken::generate().unwrap();
        let notice = notice(&token);

        delivery.deliver(&notice).await.unwrap();

        let bodies = captured.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["token"], token.expose());
        assert_eq!(bodies[0]["email"], "tom@example.com");
        assert_eq!(bodies[0]["role"], "technician");
        assert_eq!(bodies[0]["identity_id"], notice.identity_id.to_string());
    }

    #[tokio::test]
    async fn test_error_status_is_rejected() {
        let (endpoint, _) = spawn_mailer(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
        let delivery = WebhookInvitationDelivery::new(endpoint, Duration::from_secs(5)).unwrap();

        let result = delivery
            .deliver(&notice(&InvitationToken::generate().unwrap()))
            .await;

        assert!(matches!(result, Err(DeliveryError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_slow_mailer_times_out() {
        let (endpoint, _) = spawn_mailer(StatusCode::OK, Duration::from_secs(2)).await;
        let delivery =
            WebhookInvitationDelivery::new(endpoint, Duration::from_millis(100)).unwrap();

        let result = delivery
            .deliver(&notice(&InvitationToken::generate().unwrap()))
            .await;

        assert!(matches!(result, Err(DeliveryError::Timeout)));
    }

    #[test]
    fn test_empty_endpoint_is_refused() {
        let result = WebhookInvitationDelivery::new("  ", Duration::from_secs(1));
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }
}
