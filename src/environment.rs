use crate::constants::CONFIG_FILE_NAME;
use crate::types::EnvironmentKind;
use crate::utils::PathGrammar;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Files whose content identifies a WSL kernel
const WSL_SIGNATURE_FILES: [&str; 2] = ["/proc/sys/kernel/osrelease", "/proc/version"];

/// The runtime the process runs in, classified once at startup.
///
/// Build it with [`Environment::detect`] at the composition root and pass it
/// down; tests build one by hand with [`Environment::new`].
#[derive(Debug, Clone)]
pub struct Environment {
    kind: EnvironmentKind,
    home_dir: PathBuf,
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn new(kind: EnvironmentKind, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            home_dir: home_dir.into(),
            vars: HashMap::new(),
        }
    }

    /// Add an environment variable to the snapshot
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Classify the current process and snapshot its environment variables
    pub fn detect() -> Self {
        let vars: HashMap<String, String> = env::vars().collect();
        let kind = detect_kind(&vars);

        let home_dir = home::home_dir()
            .or_else(|| vars.get("HOME").map(PathBuf::from))
            .or_else(|| vars.get("USERPROFILE").map(PathBuf::from))
            .unwrap_or_else(|| {
                warn!("Could not determine home directory, using current directory");
                PathBuf::from(".")
            });

        debug!(%kind, home = %home_dir.display(), "Detected environment");

        Self {
            kind,
            home_dir,
            vars,
        }
    }

    pub fn kind(&self) -> EnvironmentKind {
        self.kind
    }

    pub fn is_windows(&self) -> bool {
        self.kind == EnvironmentKind::Windows
    }

    pub fn is_wsl(&self) -> bool {
        self.kind == EnvironmentKind::Wsl
    }

    pub fn is_macos(&self) -> bool {
        self.kind == EnvironmentKind::MacOs
    }

    pub fn is_linux(&self) -> bool {
        self.kind == EnvironmentKind::Linux
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Name of the distro this process runs in, when inside WSL
    pub fn distro_name(&self) -> Option<&str> {
        if self.is_wsl() {
            self.var("WSL_DISTRO_NAME")
        } else {
            None
        }
    }

    /// Native path grammar of the platform
    pub fn grammar(&self) -> PathGrammar {
        if self.is_windows() {
            PathGrammar::Windows
        } else {
            PathGrammar::Posix
        }
    }

    pub fn join(&self, base: &str, segment: &str) -> String {
        self.grammar().join(base, segment)
    }

    /// `~/.claude.json` for the current user
    pub fn config_path(&self) -> String {
        self.join(&self.home_dir.to_string_lossy(), CONFIG_FILE_NAME)
    }
}

fn detect_kind(vars: &HashMap<String, String>) -> EnvironmentKind {
    if cfg!(windows) {
        EnvironmentKind::Windows
    } else if cfg!(target_os = "macos") {
        EnvironmentKind::MacOs
    } else if vars.contains_key("WSL_DISTRO_NAME") || vars.contains_key("WSL_INTEROP") {
        EnvironmentKind::Wsl
    } else if WSL_SIGNATURE_FILES.iter().any(|path| {
        fs::read_to_string(path)
            .map(|content| has_wsl_signature(&content))
            .unwrap_or(false)
    }) {
        EnvironmentKind::Wsl
    } else {
        EnvironmentKind::Linux
    }
}

/// Whether a kernel release/version string comes from a WSL kernel
pub fn has_wsl_signature(kernel: &str) -> bool {
    let kernel = kernel.to_ascii_lowercase();
    kernel.contains("microsoft") || kernel.contains("wsl")
}
