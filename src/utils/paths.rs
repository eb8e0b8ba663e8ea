//! Conversion between the three path grammars the config can contain:
//! POSIX paths, Windows drive paths and UNC paths into a WSL distro.
//!
//! Everything here is pure string manipulation. Nothing touches the
//! filesystem, so these work the same whichever OS runs them.

use crate::constants::{MOUNT_ROOT, UNC_LEGACY_ROOT, UNC_MODERN_ROOT};
use crate::types::UncScheme;
use std::fmt;

/// Separator convention of a path string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathGrammar {
    Posix,
    Windows,
}

impl PathGrammar {
    pub fn separator(&self) -> char {
        match self {
            PathGrammar::Posix => '/',
            PathGrammar::Windows => '\\',
        }
    }

    /// Join `segment` onto `base` with exactly one separator between them
    pub fn join(&self, base: &str, segment: &str) -> String {
        let sep = self.separator();
        let base = base.trim_end_matches(['/', '\\']);
        let segment = segment.trim_start_matches(['/', '\\']);
        format!("{base}{sep}{segment}")
    }
}

pub fn is_unc_path(path: &str) -> bool {
    path.starts_with(r"\\")
}

/// `C:`, `C:\...` or `C:/...`
pub fn is_windows_drive_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes.len() == 2 || bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Convert a POSIX path inside `distro` to the UNC path Windows uses to reach it.
///
/// `/home/u/app` becomes `\\wsl.localhost\Ubuntu\home\u\app` (or `\\wsl$\...`
/// for the legacy scheme). UNC and non-absolute input come back unchanged,
/// which makes the conversion idempotent.
pub fn to_windows_path(path: &str, distro: &str, scheme: UncScheme) -> String {
    if is_unc_path(path) || !path.starts_with('/') {
        return path.to_string();
    }

    format!("{}{}", scheme.distro_root(distro), path.replace('/', "\\"))
}

/// Convert a Windows path to the path WSL sees, using the default mount root.
pub fn to_wsl_path(path: &str) -> String {
    to_wsl_path_with_root(path, MOUNT_ROOT)
}

/// Convert a Windows path to the path WSL sees.
///
/// Drive paths map to `<mount_root>/<drive>/...` with the drive letter
/// lowercased and the rest of the path kept as is. UNC paths into a WSL
/// distro map back to the POSIX path inside it. Anything else, including
/// other UNC shares and POSIX paths, comes back unchanged.
pub fn to_wsl_path_with_root(path: &str, mount_root: &str) -> String {
    if let Some(inner) = strip_wsl_unc_root(path) {
        return if inner.is_empty() {
            "/".to_string()
        } else {
            inner.replace('\\', "/")
        };
    }

    if !is_windows_drive_path(path) {
        return path.to_string();
    }

    let drive = path[..1].to_ascii_lowercase();
    let rest = path[2..].replace('\\', "/");
    format!("{}/{}{}", mount_root.trim_end_matches('/'), drive, rest)
}

/// For `\\wsl.localhost\<distro>\rest` or `\\wsl$\<distro>\rest` return `\rest`
fn strip_wsl_unc_root(path: &str) -> Option<&str> {
    let after_root = [UNC_MODERN_ROOT, UNC_LEGACY_ROOT]
        .iter()
        .find_map(|root| strip_prefix_ignore_case(path, root))?;
    let after_root = after_root.strip_prefix('\\')?;
    let distro_end = after_root.find('\\').unwrap_or(after_root.len());
    if distro_end == 0 {
        return None;
    }
    Some(&after_root[distro_end..])
}

fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let head = path.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&path[prefix.len()..])
    } else {
        None
    }
}

/// Rewrites project paths from the grammar of the environment that wrote
/// the config into the grammar of the environment reading it.
pub trait PathTranslator: Send + Sync + fmt::Debug {
    fn translate(&self, path: &str) -> String;

    /// Grammar of the translated paths
    fn grammar(&self) -> PathGrammar;
}

/// Same environment on both sides
#[derive(Debug, Clone, Copy)]
pub struct IdentityTranslator {
    pub grammar: PathGrammar,
}

impl PathTranslator for IdentityTranslator {
    fn translate(&self, path: &str) -> String {
        path.to_string()
    }

    fn grammar(&self) -> PathGrammar {
        self.grammar
    }
}

/// Windows reading a config that lives inside a WSL distro
#[derive(Debug, Clone)]
pub struct WslToWindows {
    pub distro: String,
    pub scheme: UncScheme,
}

impl PathTranslator for WslToWindows {
    fn translate(&self, path: &str) -> String {
        to_windows_path(path, &self.distro, self.scheme)
    }

    fn grammar(&self) -> PathGrammar {
        PathGrammar::Windows
    }
}

/// WSL reading a config that lives on the Windows side
#[derive(Debug, Clone)]
pub struct WindowsToWsl {
    pub mount_root: String,
}

impl Default for WindowsToWsl {
    fn default() -> Self {
        Self {
            mount_root: MOUNT_ROOT.to_string(),
        }
    }
}

impl PathTranslator for WindowsToWsl {
    fn translate(&self, path: &str) -> String {
        to_wsl_path_with_root(path, &self.mount_root)
    }

    fn grammar(&self) -> PathGrammar {
        PathGrammar::Posix
    }
}
