use crate::application_port::SessionTransition;
use crate::domain_model::*;
use crate::domain_port::Navigator;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Unauthenticated,
    Authenticated(Session),
}

/// Routing guard driven by provider session notifications.
#[derive(Debug, Default)]
pub struct SessionWatcher {
    state: SessionState,
}

impl SessionWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }

    /// Applies one provider notification and redirects accordingly.
    pub fn apply(
        &mut self,
        notification: Option<Session>,
        navigator: &dyn Navigator,
    ) -> SessionTransition {
        let transition = match notification {
            None => {
                if navigator.current() != Route::Login {
                    navigator.navigate(Route::Login);
                }
                match std::mem::take(&mut self.state) {
                    SessionState::Authenticated(_) => SessionTransition::SignedOut,
                    SessionState::Unauthenticated => SessionTransition::Unchanged,
                }
            }
            Some(session) => {
                let transition = match self.session() {
                    Some(current) if *current == session => SessionTransition::Unchanged,
                    Some(current) if current.user_id == session.user_id => {
                        SessionTransition::Refreshed
                    }
                    _ => SessionTransition::SignedIn(session.clone()),
                };
                self.state = SessionState::Authenticated(session);
                transition
            }
        };

        if self.session().is_some() && navigator.current() == Route::Login {
            navigator.navigate(Route::ChatRoot);
        }

        tracing::info!(?transition, "session notification applied");
        transition
    }
}
