mod chat_client;
mod console;
mod render;
mod router;

pub mod testing;

pub use chat_client::*;
pub use console::*;
pub use render::*;
pub use router::*;
