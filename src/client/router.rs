use crate::domain_model::Route;
use crate::domain_port::Navigator;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct RouterState {
    current: Route,
    history: Vec<Route>,
}

/// In-process router: remembers the current route and every redirect.
#[derive(Debug)]
pub struct MemoryRouter {
    state: Mutex<RouterState>,
}

impl MemoryRouter {
    pub fn at(route: Route) -> Self {
        Self {
            state: Mutex::new(RouterState {
                current: route,
                history: Vec::new(),
            }),
        }
    }

    /// Redirects performed so far, oldest first.
    pub fn history(&self) -> Vec<Route> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .clone()
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::at(Route::ChatRoot)
    }
}

impl Navigator for MemoryRouter {
    fn navigate(&self, route: Route) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.current != route {
            tracing::debug!(from = %state.current, to = %route, "navigate");
        }
        state.current = route;
        state.history.push(route);
    }

    fn current(&self) -> Route {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
    }
}
