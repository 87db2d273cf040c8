mod feed;
mod message;
mod route;
mod user;

pub use feed::*;
pub use message::*;
pub use route::*;
pub use user::*;
