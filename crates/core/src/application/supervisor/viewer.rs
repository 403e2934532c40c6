// Viewer command configuration

use super::constants::DEFAULT_GO_BIN;
use crate::domain::ViewerKind;
use std::path::Path;

/// An external viewer invocation; the artifact path is appended as the last argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ViewerCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Full argument list for viewing the artifact at `path`
    pub fn args_for(&self, path: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(path.to_string_lossy().into_owned());
        args
    }
}

/// Viewer per profile kind
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub pprof: ViewerCommand,
    pub trace: ViewerCommand,
}

impl ViewerConfig {
    /// `go tool pprof` / `go tool trace`, each serving its UI on an ephemeral local port
    pub fn go(go_bin: impl Into<String>) -> Self {
        let go_bin = go_bin.into();
        Self {
            pprof: ViewerCommand::new(go_bin.clone(), ["tool", "pprof", "-http=:"]),
            trace: ViewerCommand::new(go_bin, ["tool", "trace", "-http=localhost:0"]),
        }
    }

    /// Same command for every kind of profile
    pub fn uniform(command: ViewerCommand) -> Self {
        Self {
            pprof: command.clone(),
            trace: command,
        }
    }

    pub fn command_for(&self, kind: ViewerKind) -> &ViewerCommand {
        match kind {
            ViewerKind::Pprof => &self.pprof,
            ViewerKind::Trace => &self.trace,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::go(DEFAULT_GO_BIN)
    }
}
