use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::SubscriberSet;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::{Arc, Mutex, PoisonError};

const MIN_PASSWORD_LEN: usize = 6;

const BADLY_FORMATTED: &str = "The email address is badly formatted.";
const WEAK_PASSWORD: &str = "Password should be at least 6 characters.";
const EMAIL_IN_USE: &str = "The email address is already in use by another account.";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Clone)]
struct AccountRecord {
    user_id: UserId,
    email: Email,
    password_hash: String,
}

/// Accounts shared by every provider instance, the in-process stand-in for
/// the provider's user database.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: DashMap<String, AccountRecord>,
    reset_outbox: Mutex<Vec<Email>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Addresses a reset mail was sent to, oldest first.
    pub fn sent_resets(&self) -> Vec<Email> {
        self.reset_outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn key(email: &Email) -> String {
        email.as_str().to_lowercase()
    }
}

/// One client's view of the identity provider: shared accounts, private
/// current session.
pub struct MemoryIdentityProvider {
    directory: Arc<AccountDirectory>,
    current: Mutex<Option<Session>>,
    subscribers: SubscriberSet<(), Option<Session>>,
}

impl MemoryIdentityProvider {
    pub fn new(directory: Arc<AccountDirectory>) -> Self {
        Self {
            directory,
            current: Mutex::new(None),
            subscribers: SubscriberSet::new(),
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, session: Option<Session>) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = session.clone();
        let delivered = self.subscribers.publish(|_| Some(session.clone()));
        tracing::debug!(delivered, signed_in = session.is_some(), "session change published");
    }
}

fn is_well_formed(email: &Email) -> bool {
    match email.as_str().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn hash_password(password: &str) -> Result<String, ProviderError> {
    // Light parameters: this adapter backs tests and the demo console.
    let params = Params::new(4096, 1, 1, None).map_err(|e| ProviderError::new(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ProviderError::new(e.to_string()))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, ProviderError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| ProviderError::new(format!("invalid PHC hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ProviderError::new(format!("verify error: {}", e))),
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(&self, email: &Email, password: &str) -> Result<UserId, ProviderError> {
        if !is_well_formed(email) {
            return Err(ProviderError::new(BADLY_FORMATTED));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ProviderError::new(WEAK_PASSWORD));
        }

        let password_hash = hash_password(password)?;
        match self.directory.accounts.entry(AccountDirectory::key(email)) {
            Entry::Occupied(_) => Err(ProviderError::new(EMAIL_IN_USE)),
            Entry::Vacant(slot) => {
                let user_id = UserId::generate();
                slot.insert(AccountRecord {
                    user_id: user_id.clone(),
                    email: email.clone(),
                    password_hash,
                });
                tracing::info!(%user_id, "account created");
                Ok(user_id)
            }
        }
    }

    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, ProviderError> {
        if !is_well_formed(email) {
            return Err(ProviderError::new(BADLY_FORMATTED));
        }

        let account = self
            .directory
            .accounts
            .get(&AccountDirectory::key(email))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProviderError::new(INVALID_CREDENTIALS))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(ProviderError::new(INVALID_CREDENTIALS));
        }

        let session = Session {
            user_id: account.user_id,
            email: account.email,
        };
        self.set_current(Some(session.clone()));
        Ok(session)
    }

    async fn send_password_reset(&self, email: &Email) -> Result<(), ProviderError> {
        if !is_well_formed(email) {
            return Err(ProviderError::new(BADLY_FORMATTED));
        }

        if let Some(account) = self.directory.accounts.get(&AccountDirectory::key(email)) {
            self.directory
                .reset_outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(account.email.clone());
        }
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.set_current(None);
        Ok(())
    }

    fn subscribe_sessions(&self) -> Subscription<Option<Session>> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let (subscriber, subscription) = subscription_channel();
        subscriber.deliver(current.clone());
        self.subscribers.register((), subscriber);
        subscription
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryIdentityProvider {
        MemoryIdentityProvider::new(Arc::new(AccountDirectory::new()))
    }

    #[tokio::test]
    async fn create_account_does_not_sign_in() {
        let provider = provider();
        let mut sessions = provider.subscribe_sessions();
        assert_eq!(sessions.next().await, Some(None));

        provider
            .create_account(&Email::new("a@student.hs-rm.de"), "secret1")
            .await
            .unwrap();

        assert_eq!(provider.current_session(), None);
        assert_eq!(sessions.try_next(), None);
    }

    #[tokio::test]
    async fn sign_in_publishes_session() {
        let provider = provider();
        let email = Email::new("a@student.hs-rm.de");
        let user_id = provider.create_account(&email, "secret1").await.unwrap();
        let mut sessions = provider.subscribe_sessions();
        assert_eq!(sessions.next().await, Some(None));

        let session = provider.sign_in(&email, "secret1").await.unwrap();

        assert_eq!(session.user_id, user_id);
        assert_eq!(sessions.next().await, Some(Some(session)));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let provider = provider();
        let email = Email::new("a@student.hs-rm.de");
        provider.create_account(&email, "secret1").await.unwrap();

        let err = provider.sign_in(&email, "secret2").await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
        assert_eq!(provider.current_session(), None);
    }

    #[tokio::test]
    async fn duplicate_account_is_rejected_case_insensitively() {
        let provider = provider();
        provider
            .create_account(&Email::new("a@student.hs-rm.de"), "secret1")
            .await
            .unwrap();

        let err = provider
            .create_account(&Email::new("A@student.hs-rm.de"), "secret1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), EMAIL_IN_USE);
    }

    #[tokio::test]
    async fn weak_password_and_bad_format() {
        let provider = provider();
        let weak = provider
            .create_account(&Email::new("a@student.hs-rm.de"), "123")
            .await
            .unwrap_err();
        assert_eq!(weak.to_string(), WEAK_PASSWORD);

        let malformed = provider
            .create_account(&Email::new("student.hs-rm.de"), "secret1")
            .await
            .unwrap_err();
        assert_eq!(malformed.to_string(), BADLY_FORMATTED);
    }

    #[tokio::test]
    async fn reset_is_silent_for_unknown_addresses() {
        let directory = Arc::new(AccountDirectory::new());
        let provider = MemoryIdentityProvider::new(directory.clone());
        let known = Email::new("a@student.hs-rm.de");
        provider.create_account(&known, "secret1").await.unwrap();

        provider.send_password_reset(&known).await.unwrap();
        provider
            .send_password_reset(&Email::new("ghost@student.hs-rm.de"))
            .await
            .unwrap();

        assert_eq!(directory.sent_resets(), vec![known]);
    }

    #[tokio::test]
    async fn sign_out_publishes_absent_session() {
        let provider = provider();
        let email = Email::new("a@student.hs-rm.de");
        provider.create_account(&email, "secret1").await.unwrap();
        provider.sign_in(&email, "secret1").await.unwrap();
        let mut sessions = provider.subscribe_sessions();
        assert!(matches!(sessions.next().await, Some(Some(_))));

        provider.sign_out().await.unwrap();

        assert_eq!(sessions.next().await, Some(None));
    }
}
