// Domain Layer - Pure types for profile artifacts

pub mod artifact;
pub mod error;

// Re-exports
pub use artifact::{artifact_name, type_of, validate_name, Artifact, ProfileType, ViewerKind};
pub use error::DomainError;
