pub mod action;
pub mod server;

pub use action::{Action, decode_action};
pub use server::{bind, serve};
