// Artifact Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of profile snapshot a process can expose.
///
/// The set mirrors the snapshot endpoints of a profiling-instrumented process;
/// the lowercase form is both the wire value and the artifact name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileType {
    Allocs,
    Block,
    Cmdline,
    Goroutine,
    Heap,
    Mutex,
    Profile,
    Threadcreate,
    Trace,
}

/// Which external viewer renders a profile type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    Pprof,
    Trace,
}

impl ProfileType {
    pub const ALL: [ProfileType; 9] = [
        ProfileType::Allocs,
        ProfileType::Block,
        ProfileType::Cmdline,
        ProfileType::Goroutine,
        ProfileType::Heap,
        ProfileType::Mutex,
        ProfileType::Profile,
        ProfileType::Threadcreate,
        ProfileType::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Allocs => "allocs",
            ProfileType::Block => "block",
            ProfileType::Cmdline => "cmdline",
            ProfileType::Goroutine => "goroutine",
            ProfileType::Heap => "heap",
            ProfileType::Mutex => "mutex",
            ProfileType::Profile => "profile",
            ProfileType::Threadcreate => "threadcreate",
            ProfileType::Trace => "trace",
        }
    }

    pub fn viewer_kind(&self) -> ViewerKind {
        match self {
            ProfileType::Trace => ViewerKind::Trace,
            _ => ViewerKind::Pprof,
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        ProfileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::UnknownProfileType(s.to_string()))
    }
}

/// A stored profile snapshot.
///
/// Only `name` is persisted (as the filename); `type` is parsed from it and
/// `createdAt` comes from the file's modification time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Artifact {
    pub fn new(name: impl Into<String>, created_at: i64) -> Self {
        let name = name.into();
        Self {
            profile_type: type_of(&name).to_string(),
            name,
            created_at,
        }
    }
}

/// Profile type prefix of an artifact name (everything before the first `-`)
pub fn type_of(name: &str) -> &str {
    name.split_once('-').map_or(name, |(prefix, _)| prefix)
}

/// Artifact name for a snapshot of `profile_type` taken at `unix_secs`
pub fn artifact_name(profile_type: ProfileType, unix_secs: i64) -> String {
    format!("{}-{}", profile_type, unix_secs)
}

/// Reject names that could escape the store root
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(DomainError::InvalidName(name.to_string()));
    }
    Ok(())
}
