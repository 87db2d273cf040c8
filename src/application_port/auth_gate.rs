use crate::domain_model::*;
use crate::domain_port::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Please use your {institution} email address!")]
    DomainNotAllowed { institution: String },
    #[error("Enter email first!")]
    MissingEmail,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

impl Credentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: Email::new(email),
            password: password.to_owned(),
        }
    }
}

#[async_trait::async_trait]
pub trait AuthGate: Send + Sync {
    async fn register(&self, credentials: Credentials) -> Result<UserId, AuthError>;
    async fn login(&self, credentials: Credentials) -> Result<Session, AuthError>;
    async fn reset_password(&self, email: &Email) -> Result<(), AuthError>;
    async fn logout(&self) -> Result<(), AuthError>;
}
