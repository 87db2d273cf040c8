// external collaborators

mod identity_provider;
mod realtime_store;

pub use identity_provider::*;
pub use realtime_store::*;

// ui surface

mod alerts;
mod navigator;

pub use alerts::*;
pub use navigator::*;

mod subscription;

pub use subscription::*;
