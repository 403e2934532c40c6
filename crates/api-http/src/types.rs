//! Request/Response Types
//!
//! Missing string fields deserialize as empty so the handlers can report
//! exactly which one is absent.

use pprofit_core::domain::Artifact;
use serde::{Deserialize, Serialize};

/// GET /profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub profiles: Vec<Artifact>,
}

/// POST /save
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "type")]
    pub profile_type: String,
}

/// POST /open
#[derive(Debug, Deserialize)]
pub struct OpenRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenResponse {
    pub success: bool,
}
