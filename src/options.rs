use crate::constants::{
    CACHE_TTL, CANDIDATE_USERNAMES, DEFAULT_DRIVE, LIST_TIMEOUT, MOUNT_ROOT, USERNAME_ENV_VARS,
    WSL_COMMAND, WSL_LIST_ARGS,
};
use crate::environment::Environment;
use std::time::Duration;
use tracing::warn;

/// Tunables for discovery and caching
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOptions {
    pub cache_ttl: Duration,
    pub wsl_command: String,
    pub wsl_list_args: Vec<String>,
    pub list_timeout: Duration,
    /// Windows account to read from inside WSL; auto-detected when `None`
    pub windows_user: Option<String>,
    pub username_env_vars: Vec<String>,
    pub candidate_usernames: Vec<String>,
    pub mount_root: String,
    pub drive: char,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            cache_ttl: CACHE_TTL,
            wsl_command: WSL_COMMAND.to_string(),
            wsl_list_args: WSL_LIST_ARGS.iter().map(|s| s.to_string()).collect(),
            list_timeout: LIST_TIMEOUT,
            windows_user: None,
            username_env_vars: USERNAME_ENV_VARS.iter().map(|s| s.to_string()).collect(),
            candidate_usernames: CANDIDATE_USERNAMES.iter().map(|s| s.to_string()).collect(),
            mount_root: MOUNT_ROOT.to_string(),
            drive: DEFAULT_DRIVE,
        }
    }
}

impl DiscoveryOptions {
    /// Defaults with `CCENV_*` overrides from the environment snapshot
    pub fn from_env(env: &Environment) -> Self {
        let mut options = Self::default();

        if let Some(ttl) = millis_var(env, "CCENV_CACHE_TTL_MS") {
            options.cache_ttl = ttl;
        }
        if let Some(timeout) = millis_var(env, "CCENV_LIST_TIMEOUT_MS") {
            options.list_timeout = timeout;
        }
        if let Some(command) = env.var("CCENV_WSL_COMMAND").filter(|v| !v.trim().is_empty()) {
            options.wsl_command = command.to_string();
        }
        if let Some(user) = env.var("CCENV_WINDOWS_USER").filter(|v| !v.trim().is_empty()) {
            options.windows_user = Some(user.trim().to_string());
        }

        options
    }

    /// `/mnt/c`
    pub fn drive_root(&self) -> String {
        format!(
            "{}/{}",
            self.mount_root.trim_end_matches('/'),
            self.drive.to_ascii_lowercase()
        )
    }
}

fn millis_var(env: &Environment, name: &str) -> Option<Duration> {
    let raw = env.var(name)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!(var = name, value = raw, "Ignoring non-numeric override");
            None
        }
    }
}
