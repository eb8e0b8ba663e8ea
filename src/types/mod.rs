pub mod config;
pub mod environment;
pub mod project;
pub mod wsl;

pub use config::ConfigReadResult;
pub use environment::{EnvironmentInfo, EnvironmentKind};
pub use project::{McpServerConfig, ProjectEntry, ProjectState};
pub use wsl::{DiscoveredWslInstance, UncScheme};
