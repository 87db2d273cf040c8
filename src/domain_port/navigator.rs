use crate::domain_model::Route;

/// Programmatic redirects between the two logical routes.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
    fn current(&self) -> Route;
}
