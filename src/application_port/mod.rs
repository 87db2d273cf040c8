mod auth_gate;
mod chat;

pub use auth_gate::*;
pub use chat::*;
