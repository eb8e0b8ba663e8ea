//! One facade per reachable environment.
//!
//! All variants share the same type: a [`ConfigSource`] owns the read and
//! the TTL cache, and an injected [`PathTranslator`] rewrites project paths
//! into the grammar of the environment asking for them. What differs per
//! variant is the translator and how read failures are treated.

use crate::constants::{CONFIG_FILE_NAME, CONTEXT_FILE_NAMES};
use crate::context::Context;
use crate::error::Result;
use crate::loader::ConfigSource;
use crate::normalize::normalize_projects;
use crate::types::{
    ConfigReadResult, DiscoveredWslInstance, EnvironmentInfo, EnvironmentKind, ProjectEntry,
};
use crate::utils::{
    FileSystem, IdentityTranslator, PathGrammar, PathTranslator, WindowsToWsl, WslToWindows,
    get_dotted,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacadeKind {
    /// Config of the environment the process runs in
    Native,
    /// Windows reading a WSL distro through a UNC share
    HostReadsGuest,
    /// WSL reading the Windows user profile through `/mnt/<drive>`
    GuestReadsHost,
}

impl FacadeKind {
    pub fn crosses_boundary(&self) -> bool {
        !matches!(self, FacadeKind::Native)
    }
}

pub struct DataFacade {
    info: EnvironmentInfo,
    kind: FacadeKind,
    source: ConfigSource,
    translator: Arc<dyn PathTranslator>,
    fs: Arc<dyn FileSystem>,
}

impl DataFacade {
    pub fn new(
        info: EnvironmentInfo,
        kind: FacadeKind,
        source: ConfigSource,
        translator: Arc<dyn PathTranslator>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            info,
            kind,
            source,
            translator,
            fs,
        }
    }

    /// Facade over `~/.claude.json` of the current environment
    pub fn native(ctx: &Context) -> Self {
        let config_path = ctx.env.config_path();
        let mut info = EnvironmentInfo::new(ctx.env.kind(), config_path.clone());
        if let Some(distro) = ctx.env.distro_name() {
            info = info.with_instance(distro);
        }

        let translator = IdentityTranslator {
            grammar: ctx.env.grammar(),
        };
        Self::new(
            info,
            FacadeKind::Native,
            ConfigSource::with_ttl(config_path, Arc::clone(&ctx.fs), ctx.options.cache_ttl),
            Arc::new(translator),
            Arc::clone(&ctx.fs),
        )
    }

    /// Facade over a config found inside a WSL distro, read from Windows
    pub fn wsl_instance(ctx: &Context, instance: &DiscoveredWslInstance) -> Self {
        let info = EnvironmentInfo::new(EnvironmentKind::Wsl, instance.config_path.clone())
            .with_instance(instance.distro_name.clone());
        let translator = WslToWindows {
            distro: instance.distro_name.clone(),
            scheme: instance.scheme(),
        };
        Self::new(
            info,
            FacadeKind::HostReadsGuest,
            ConfigSource::with_ttl(
                instance.config_path.clone(),
                Arc::clone(&ctx.fs),
                ctx.options.cache_ttl,
            ),
            Arc::new(translator),
            Arc::clone(&ctx.fs),
        )
    }

    /// Facade over a Windows user's config, read from inside WSL
    pub fn windows_host(ctx: &Context, username: &str) -> Self {
        let config_path = windows_host_config_path(ctx, username);
        let info = EnvironmentInfo::new(EnvironmentKind::Windows, config_path.clone());
        let translator = WindowsToWsl {
            mount_root: ctx.options.mount_root.clone(),
        };
        Self::new(
            info,
            FacadeKind::GuestReadsHost,
            ConfigSource::with_ttl(config_path, Arc::clone(&ctx.fs), ctx.options.cache_ttl),
            Arc::new(translator),
            Arc::clone(&ctx.fs),
        )
    }

    /// Like [`DataFacade::windows_host`] with the username detected
    pub async fn windows_host_auto(ctx: &Context) -> Option<Self> {
        let username = resolve_windows_user(ctx).await?;
        Some(Self::windows_host(ctx, &username))
    }

    pub fn environment_info(&self) -> &EnvironmentInfo {
        &self.info
    }

    pub fn kind(&self) -> FacadeKind {
        self.kind
    }

    pub fn config_path(&self) -> &str {
        &self.info.config_path
    }

    /// Raw config with this facade's failure policy applied.
    ///
    /// A missing native config reads as empty. Cross-boundary facades read
    /// every failure as empty: the other side being unreachable is normal.
    async fn load(&self) -> Result<Arc<ConfigReadResult>> {
        match self.source.read().await {
            Ok(result) => Ok(result),
            Err(err) if self.kind.crosses_boundary() => {
                debug!(
                    environment = %self.info,
                    code = err.code(),
                    error = %err,
                    "Environment unreachable, treating config as empty"
                );
                Ok(empty_config())
            }
            Err(err) if err.is_not_found() => Ok(empty_config()),
            Err(err) => Err(err),
        }
    }

    /// Projects with paths translated for the caller, errors surfaced
    pub async fn try_get_projects(&self) -> Result<Vec<ProjectEntry>> {
        let raw = self.load().await?;
        let projects = normalize_projects(&raw.projects)
            .into_iter()
            .map(|mut entry| {
                entry.path = self.translator.translate(&entry.path);
                entry
            })
            .collect();
        Ok(projects)
    }

    pub async fn get_projects(&self) -> Vec<ProjectEntry> {
        match self.try_get_projects().await {
            Ok(projects) => projects,
            Err(err) => {
                warn!(environment = %self.info, error = %err, "Could not read projects");
                Vec::new()
            }
        }
    }

    /// Whole parsed config, empty when it cannot be read
    pub async fn get_config(&self) -> Map<String, Value> {
        match self.load().await {
            Ok(raw) => raw.config.clone(),
            Err(err) => {
                warn!(environment = %self.info, error = %err, "Could not read config");
                Map::new()
            }
        }
    }

    /// Value at a dotted key such as `settings.theme`; `None` if any
    /// segment is missing
    pub async fn get_global_config(&self, key: &str) -> Option<Value> {
        let raw = self.load().await.ok()?;
        get_dotted(&raw.config, key).cloned()
    }

    /// Context files for a project path given in this facade's output grammar.
    ///
    /// The native facade checks which candidates exist; across a boundary
    /// the candidates are returned unchecked.
    pub async fn get_project_context_files(&self, project_path: &str) -> Vec<String> {
        let grammar = self.translator.grammar();
        let candidates: Vec<String> = CONTEXT_FILE_NAMES
            .iter()
            .map(|name| grammar.join(project_path, name))
            .collect();

        if self.kind.crosses_boundary() {
            return candidates;
        }

        let fs = Arc::clone(&self.fs);
        task::spawn_blocking(move || {
            candidates
                .into_iter()
                .filter(|candidate| fs.is_file(Path::new(candidate)))
                .collect::<Vec<_>>()
        })
        .await
        .unwrap_or_else(|err| {
            debug!(project = project_path, error = %err, "Context file check failed");
            Vec::new()
        })
    }

    /// Drop cached data; the next query reads the file again
    pub fn refresh(&self) {
        self.source.clear_cache();
    }

    /// Live probe of the config.
    ///
    /// Native: a completed [`DataFacade::get_projects`], which already reads
    /// every failure as empty. Across a boundary: the file must exist and
    /// parse.
    pub async fn is_accessible(&self) -> bool {
        if self.kind.crosses_boundary() {
            self.source.read().await.is_ok()
        } else {
            let projects = self.get_projects().await;
            debug!(environment = %self.info, count = projects.len(), "Native config read");
            true
        }
    }
}

impl std::fmt::Debug for DataFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataFacade")
            .field("info", &self.info)
            .field("kind", &self.kind)
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}

fn empty_config() -> Arc<ConfigReadResult> {
    Arc::new(ConfigReadResult::from_config(Map::new()))
}

/// `/mnt/c/Users/<name>/.claude.json`
fn windows_host_config_path(ctx: &Context, username: &str) -> String {
    let users = PathGrammar::Posix.join(&ctx.options.drive_root(), "Users");
    let home = PathGrammar::Posix.join(&users, username);
    PathGrammar::Posix.join(&home, CONFIG_FILE_NAME)
}

/// Windows account whose profile a WSL process should read.
///
/// Order: explicit option, then username environment variables (ignoring
/// `root` and values that look like paths), then the first candidate
/// username with an existing config file.
pub async fn resolve_windows_user(ctx: &Context) -> Option<String> {
    if let Some(user) = &ctx.options.windows_user {
        return Some(user.clone());
    }

    let from_env = ctx.options.username_env_vars.iter().find_map(|name| {
        ctx.env
            .var(name)
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "root" && !value.starts_with('/'))
    });
    if let Some(user) = from_env {
        debug!(user, "Windows username taken from environment");
        return Some(user.to_string());
    }

    let candidates: Vec<(String, PathBuf)> = ctx
        .options
        .candidate_usernames
        .iter()
        .map(|user| {
            let path = PathBuf::from(windows_host_config_path(ctx, user));
            (user.clone(), path)
        })
        .collect();
    let fs = Arc::clone(&ctx.fs);

    let found = task::spawn_blocking(move || {
        candidates
            .into_iter()
            .find(|(_, path)| fs.is_file(path))
            .map(|(user, _)| user)
    })
    .await
    .ok()
    .flatten();

    match &found {
        Some(user) => debug!(user = %user, "Windows username found by probing"),
        None => debug!("No Windows username could be resolved"),
    }
    found
}
