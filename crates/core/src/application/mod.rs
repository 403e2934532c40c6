// Application Layer - Use Cases

pub mod profiles;
pub mod shutdown;
pub mod supervisor;

// Re-exports
pub use profiles::ProfileService;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use supervisor::{ProcessSupervisor, SupervisedProcess, ViewerCommand, ViewerConfig};
