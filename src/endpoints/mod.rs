pub mod handlers;
mod map;
pub mod server;
