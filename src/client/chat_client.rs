use crate::application_impl::*;
use crate::application_port::*;
use crate::client::{MessageBubble, Page};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::settings::Settings;
use std::sync::Arc;

pub const REGISTERED_NOTICE: &str = "User created! You can now log in.";
pub const LOGGED_IN_NOTICE: &str = "Logged in successfully!";
pub const RESET_SENT_NOTICE: &str = "Reset email sent!";

/// External collaborators the client talks to.
#[derive(Clone)]
pub struct ChatServices {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn RealtimeStore>,
    pub navigator: Arc<dyn Navigator>,
    pub alerts: Arc<dyn Alerts>,
}

#[derive(Debug, Clone)]
pub struct ChatClientConfig {
    pub collection: String,
    pub feed: FeedConfig,
    pub policy: DomainPolicy,
}

impl ChatClientConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            collection: settings.store.collection.clone(),
            feed: settings.feed_config(),
            policy: settings.domain_policy(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Session(SessionTransition),
    Feed(FeedUpdate),
}

/// Single owner of the chat view's state: session, feed window, draft.
///
/// Every external notification reaches the state through [`ChatClient::step`]
/// or [`ChatClient::drain_pending`]; UI actions are the remaining methods.
pub struct ChatClient {
    auth_gate: Arc<dyn AuthGate>,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    alerts: Arc<dyn Alerts>,
    watcher: SessionWatcher,
    sessions: Option<Subscription<Option<Session>>>,
    feed: FeedViewModel,
    composer: Composer,
    deleter: Deleter,
    pager: ScrollPager,
    draft: String,
}

impl ChatClient {
    pub fn new(services: ChatServices, config: ChatClientConfig) -> Self {
        let ChatServices {
            identity,
            store,
            navigator,
            alerts,
        } = services;

        Self {
            auth_gate: Arc::new(RealAuthGate::new(identity.clone(), config.policy)),
            identity,
            navigator,
            alerts,
            watcher: SessionWatcher::new(),
            sessions: None,
            feed: FeedViewModel::new(store.clone(), &config.collection, config.feed.initial_limit),
            composer: Composer::new(store.clone(), &config.collection),
            deleter: Deleter::new(store, &config.collection),
            pager: ScrollPager::from_config(&config.feed),
            draft: String::new(),
        }
    }

    /// Wires a client to the backends named in `settings`.
    pub fn try_new(
        settings: &Settings,
        accounts: Arc<AccountDirectory>,
        store: Arc<MemoryRealtimeStore>,
        navigator: Arc<dyn Navigator>,
        alerts: Arc<dyn Alerts>,
    ) -> anyhow::Result<Self> {
        let identity: Arc<dyn IdentityProvider> = match settings.auth.backend.as_str() {
            "memory" => Arc::new(MemoryIdentityProvider::new(accounts)),
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };
        let store: Arc<dyn RealtimeStore> = match settings.store.backend.as_str() {
            "memory" => store,
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let services = ChatServices {
            identity,
            store,
            navigator,
            alerts,
        };
        Ok(Self::new(services, ChatClientConfig::from_settings(settings)))
    }

    // region lifecycle

    /// Subscribes to session changes. Idempotent.
    pub fn start(&mut self) {
        if self.sessions.is_none() {
            self.sessions = Some(self.identity.subscribe_sessions());
            tracing::debug!("session watcher started");
        }
    }

    /// Cancels every subscription the client holds.
    pub fn stop(&mut self) {
        if let Some(sessions) = self.sessions.take() {
            sessions.cancel();
        }
        self.feed.close();
        tracing::debug!("client stopped");
    }

    /// Waits for the next external notification and applies it. Returns
    /// `None` when the client is not started.
    pub async fn step(&mut self) -> Option<ClientEvent> {
        enum Incoming {
            Session(Option<Session>),
            Feed(FeedUpdate),
        }

        let sessions = self.sessions.as_mut()?;
        let incoming = tokio::select! {
            Some(notification) = sessions.next() => Incoming::Session(notification),
            Some(update) = self.feed.next_update() => Incoming::Feed(update),
            else => return None,
        };

        match incoming {
            Incoming::Session(notification) => {
                Some(ClientEvent::Session(self.on_session(notification)))
            }
            Incoming::Feed(update) => Some(ClientEvent::Feed(update)),
        }
    }

    /// Applies every queued notification without waiting. Session changes
    /// go first so a feed opened by them is drained in the same call.
    pub fn drain_pending(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Some(notification) = self.sessions.as_mut().and_then(|s| s.try_next()) {
            events.push(ClientEvent::Session(self.on_session(notification)));
        }
        events.extend(self.feed.drain_pending().into_iter().map(ClientEvent::Feed));
        events
    }

    fn on_session(&mut self, notification: Option<Session>) -> SessionTransition {
        let transition = self.watcher.apply(notification, self.navigator.as_ref());
        match &transition {
            SessionTransition::SignedIn(session) => {
                tracing::info!(user_id = %session.user_id, "signed in, opening feed");
                self.feed.close();
                self.feed.open();
            }
            SessionTransition::SignedOut => {
                tracing::info!("signed out, closing feed");
                self.feed.close();
                self.draft.clear();
            }
            SessionTransition::Refreshed | SessionTransition::Unchanged => {}
        }
        transition
    }

    // endregion

    // region login form

    pub async fn register(&self, email: &str, password: &str) -> bool {
        match self.auth_gate.register(Credentials::new(email, password)).await {
            Ok(_) => self.notify(REGISTERED_NOTICE, true),
            Err(e) => self.notify(&e.to_string(), false),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        match self.auth_gate.login(Credentials::new(email, password)).await {
            Ok(_) => self.notify(LOGGED_IN_NOTICE, true),
            Err(e) => self.notify(&e.to_string(), false),
        }
    }

    pub async fn reset_password(&self, email: &str) -> bool {
        match self.auth_gate.reset_password(&Email::new(email)).await {
            Ok(()) => self.notify(RESET_SENT_NOTICE, true),
            Err(e) => self.notify(&e.to_string(), false),
        }
    }

    pub async fn logout(&self) -> bool {
        match self.auth_gate.logout().await {
            Ok(()) => true,
            Err(e) => self.notify(&e.to_string(), false),
        }
    }

    fn notify(&self, message: &str, outcome: bool) -> bool {
        self.alerts.alert(message);
        outcome
    }

    // endregion

    // region chat

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_owned();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Sends the draft. The draft is cleared only once the store accepted it.
    pub async fn submit(&mut self) -> Option<MessageId> {
        match self.composer.send(self.watcher.session(), &self.draft).await {
            Ok(Some(id)) => {
                self.draft.clear();
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                self.alerts
                    .alert(&format!("Message could not be sent: {}", e));
                None
            }
        }
    }

    pub async fn delete(&self, id: &MessageId) -> bool {
        self.deleter.delete(id).await
    }

    pub fn scroll(&mut self, scroll_top: u32) -> PagerOutcome {
        self.pager.on_scroll(scroll_top, &mut self.feed)
    }

    // endregion

    // region view

    pub fn session(&self) -> Option<&Session> {
        self.watcher.session()
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn feed(&self) -> &FeedViewModel {
        &self.feed
    }

    pub fn page(&self) -> Page {
        Page::render(
            self.route(),
            self.session(),
            self.feed.messages(),
            &self.draft,
        )
    }

    pub fn bubbles(&self) -> Vec<MessageBubble> {
        match self.page() {
            Page::Chat { bubbles, .. } => bubbles,
            Page::Login | Page::SignedOut => Vec::new(),
        }
    }

    // endregion
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        if let Some(sessions) = self.sessions.take() {
            sessions.cancel();
        }
    }
}
