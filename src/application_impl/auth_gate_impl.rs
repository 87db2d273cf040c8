use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::IdentityProvider;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct DomainPolicy {
    /// Suffix every registering address must end with, e.g. `@student.hs-rm.de`.
    pub allowed_suffix: String,
    /// Shown in the rejection message.
    pub institution: String,
}

impl DomainPolicy {
    pub fn admits(&self, email: &Email) -> bool {
        email.has_suffix(&self.allowed_suffix)
    }
}

pub struct RealAuthGate {
    provider: Arc<dyn IdentityProvider>,
    policy: DomainPolicy,
}

impl RealAuthGate {
    pub fn new(provider: Arc<dyn IdentityProvider>, policy: DomainPolicy) -> Self {
        Self { provider, policy }
    }
}

#[async_trait::async_trait]
impl AuthGate for RealAuthGate {
    async fn register(&self, credentials: Credentials) -> Result<UserId, AuthError> {
        if !self.policy.admits(&credentials.email) {
            tracing::debug!(email = %credentials.email, "registration outside allowed domain");
            return Err(AuthError::DomainNotAllowed {
                institution: self.policy.institution.clone(),
            });
        }
        let user_id = self
            .provider
            .create_account(&credentials.email, &credentials.password)
            .await?;
        Ok(user_id)
    }

    async fn login(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let session = self
            .provider
            .sign_in(&credentials.email, &credentials.password)
            .await?;
        Ok(session)
    }

    async fn reset_password(&self, email: &Email) -> Result<(), AuthError> {
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        self.provider.send_password_reset(email).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        Ok(())
    }
}
