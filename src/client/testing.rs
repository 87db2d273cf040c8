//! Test doubles for driving a [`ChatClient`](crate::client::ChatClient)
//! without a terminal or a real provider.

use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Collects alerts instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages().pop()
    }
}

impl Alerts for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

/// Wraps a provider and counts the calls that reach it.
pub struct CountingIdentityProvider {
    inner: Arc<dyn IdentityProvider>,
    calls: AtomicUsize,
}

impl CountingIdentityProvider {
    pub fn new(inner: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Account, sign-in, reset and sign-out calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for CountingIdentityProvider {
    async fn create_account(&self, email: &Email, password: &str) -> Result<UserId, ProviderError> {
        self.count();
        self.inner.create_account(email, password).await
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, ProviderError> {
        self.count();
        self.inner.sign_in(email, password).await
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), ProviderError> {
        self.count();
        self.inner.send_password_reset(email).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.count();
        self.inner.sign_out().await
    }

    fn subscribe_sessions(&self) -> Subscription<Option<Session>> {
        self.inner.subscribe_sessions()
    }
}
