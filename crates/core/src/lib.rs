// pprofit Core - Domain Logic & Ports
// NO infrastructure dependencies (filesystem, HTTP and process adapters live in infra crates)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
