use crate::domain_model::*;
use crate::domain_port::Subscription;

/// Opaque failure reported by the identity provider. The message is shown
/// to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. Does not sign the new user in.
    async fn create_account(&self, email: &Email, password: &str) -> Result<UserId, ProviderError>;

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, ProviderError>;

    /// Whether the address has an account is not revealed to the caller.
    async fn send_password_reset(&self, email: &Email) -> Result<(), ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Emits the current session immediately, then on every change.
    fn subscribe_sessions(&self) -> Subscription<Option<Session>>;
}
