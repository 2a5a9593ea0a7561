//! HTTP executor server
//!
//! Exposes the operation dispatcher as `POST /components/{id}/execute` so a
//! remote client gets exactly the results an in-process caller would.

pub mod handler;
pub mod server;

pub use server::{router, HttpServer};
