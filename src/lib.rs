// Module declarations
pub mod constants;
pub mod context;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod facade;
pub mod loader;
pub mod normalize;
pub mod options;
pub mod types;
pub mod utils;
pub mod wsl;

// Re-export commonly used items
pub use context::Context;
pub use discovery::{Discovery, FacadeList};
pub use environment::Environment;
pub use error::{ConfigError, Result};
pub use facade::{DataFacade, FacadeKind};
pub use loader::ConfigSource;
pub use normalize::normalize_projects;
pub use options::DiscoveryOptions;
pub use types::{
    ConfigReadResult, DiscoveredWslInstance, EnvironmentInfo, EnvironmentKind, McpServerConfig,
    ProjectEntry, ProjectState, UncScheme,
};
pub use utils::{to_windows_path, to_wsl_path};
