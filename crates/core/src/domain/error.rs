// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unknown profile type `{0}`")]
    UnknownProfileType(String),

    #[error("invalid profile name `{0}`")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
