//! HTTP Control API
//!
//! Serves the HTML shell and the JSON endpoints that list, save and open
//! profiles.

pub mod error;
pub mod extract;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{build_router, AppState, HttpServer, HttpServerConfig};
