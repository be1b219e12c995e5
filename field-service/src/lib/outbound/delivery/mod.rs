use async_trait::async_trait;

use crate::domain::invitation::errors::DeliveryError;
use crate::domain::invitation::models::InvitationNotice;
use crate::domain::invitation::ports::InvitationDelivery;

pub mod webhook;

pub use webhook::WebhookInvitationDelivery;

/// Delivery used when no mailer endpoint is configured.
///
/// Every notice is refused, so provisioning reports `invite_sent = false`
/// and the account can be re-invited once delivery is set up.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredDelivery;

#[async_trait]
impl InvitationDelivery for UnconfiguredDelivery {
    async fn deliver(&self, notice: &InvitationNotice) -> Result<(), DeliveryError> {
        tracing::warn!(
            invitation_id = %notice.invitation_id,
            identity_id = %notice.identity_id,
            "No invitation delivery endpoint configured"
        );
        Err(DeliveryError::Rejected(
            "no delivery endpoint configured".to_string(),
        ))
    }
}
