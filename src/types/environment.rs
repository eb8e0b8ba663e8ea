use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EnvironmentKind {
    Windows,
    #[serde(rename = "WSL")]
    Wsl,
    #[serde(rename = "macOS")]
    MacOs,
    Linux,
}

impl EnvironmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentKind::Windows => "Windows",
            EnvironmentKind::Wsl => "WSL",
            EnvironmentKind::MacOs => "macOS",
            EnvironmentKind::Linux => "Linux",
        }
    }
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the environment a facade reads from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    #[serde(rename = "type")]
    pub kind: EnvironmentKind,
    pub config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
}

impl EnvironmentInfo {
    pub fn new(kind: EnvironmentKind, config_path: impl Into<String>) -> Self {
        Self {
            kind,
            config_path: config_path.into(),
            instance_name: None,
        }
    }

    pub fn with_instance(mut self, name: impl Into<String>) -> Self {
        self.instance_name = Some(name.into());
        self
    }

    /// Short human readable name, e.g. "WSL (Ubuntu)"
    pub fn label(&self) -> String {
        match &self.instance_name {
            Some(name) => format!("{} ({})", self.kind, name),
            None => self.kind.to_string(),
        }
    }
}

impl fmt::Display for EnvironmentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_label() {
        let info = EnvironmentInfo::new(EnvironmentKind::Windows, r"C:\Users\u\.claude.json");
        assert_eq!(info.label(), "Windows");

        let info = EnvironmentInfo::new(
            EnvironmentKind::Wsl,
            r"\\wsl.localhost\Ubuntu\home\u\.claude.json",
        )
        .with_instance("Ubuntu");
        assert_eq!(format!("{}", info), "WSL (Ubuntu)");
    }

    #[test]
    fn test_environment_info_serialization() {
        let info = EnvironmentInfo::new(EnvironmentKind::MacOs, "/Users/u/.claude.json");
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["type"], "macOS");
        assert_eq!(json["configPath"], "/Users/u/.claude.json");
        assert!(json.get("instanceName").is_none());
    }
}
