/// Blocking user-facing notification, the counterpart of a browser alert.
pub trait Alerts: Send + Sync {
    fn alert(&self, message: &str);
}
