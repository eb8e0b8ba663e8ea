use crate::constants::{UNC_LEGACY_ROOT, UNC_MODERN_ROOT};

/// Which UNC root addresses a distro from Windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UncScheme {
    /// `\\wsl.localhost\<distro>`
    Modern,
    /// `\\wsl$\<distro>`
    Legacy,
}

impl UncScheme {
    pub fn from_legacy_flag(legacy: bool) -> Self {
        if legacy {
            UncScheme::Legacy
        } else {
            UncScheme::Modern
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, UncScheme::Legacy)
    }

    pub fn root(&self) -> &'static str {
        match self {
            UncScheme::Modern => UNC_MODERN_ROOT,
            UncScheme::Legacy => UNC_LEGACY_ROOT,
        }
    }

    /// Root of one distro's filesystem, e.g. `\\wsl.localhost\Ubuntu`
    pub fn distro_root(&self, distro: &str) -> String {
        format!(r"{}\{}", self.root(), distro)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredWslInstance {
    pub distro_name: String,
    /// UNC path of the distro user's config file
    pub config_path: String,
    pub use_legacy_format: bool,
}

impl DiscoveredWslInstance {
    pub fn scheme(&self) -> UncScheme {
        UncScheme::from_legacy_flag(self.use_legacy_format)
    }
}
