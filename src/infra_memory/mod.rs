mod identity_provider_memory;
mod realtime_store_memory;
mod subscribers;

pub use identity_provider_memory::*;
pub use realtime_store_memory::*;
pub use subscribers::*;
