// Supervisor constants
use std::time::Duration;

/// How long a viewer must stay up before its launch counts as successful (2s)
pub const DEFAULT_LIVENESS_WINDOW: Duration = Duration::from_secs(2);

/// Toolchain binary that provides `tool pprof` and `tool trace`
pub const DEFAULT_GO_BIN: &str = "go";
