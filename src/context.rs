use crate::environment::Environment;
use crate::options::DiscoveryOptions;
use crate::utils::{FileSystem, OsFileSystem};
use crate::wsl::{DistroLister, WslCommand};
use std::sync::Arc;

/// Everything discovery needs from the outside world, built once at the
/// composition root and shared by every facade.
#[derive(Clone)]
pub struct Context {
    pub env: Arc<Environment>,
    pub options: Arc<DiscoveryOptions>,
    pub fs: Arc<dyn FileSystem>,
    pub lister: Arc<dyn DistroLister>,
}

impl Context {
    pub fn new(
        env: Environment,
        options: DiscoveryOptions,
        fs: Arc<dyn FileSystem>,
        lister: Arc<dyn DistroLister>,
    ) -> Self {
        Self {
            env: Arc::new(env),
            options: Arc::new(options),
            fs,
            lister,
        }
    }

    /// Real environment, real filesystem and `wsl.exe`
    pub fn from_system() -> Self {
        let env = Environment::detect();
        let options = DiscoveryOptions::from_env(&env);
        let lister = WslCommand::new(
            options.wsl_command.clone(),
            options.wsl_list_args.clone(),
            options.list_timeout,
        );
        Self::new(env, options, Arc::new(OsFileSystem), Arc::new(lister))
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("env", &self.env)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
