mod auth_gate_impl;
mod composer;
mod deleter;
mod feed_view_model;
mod pager;
mod session_watcher;

pub use auth_gate_impl::*;
pub use composer::*;
pub use deleter::*;
pub use feed_view_model::*;
pub use pager::*;
pub use session_watcher::*;
