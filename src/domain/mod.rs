//! Backend-agnostic domain logic.

mod server;

pub use server::{Action, BackendKind, Server, ServerId, Status};
