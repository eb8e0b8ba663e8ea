use serde_json::{Map, Value};

/// Raw result of reading one config file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigReadResult {
    /// The whole parsed document
    pub config: Map<String, Value>,
    /// The `projects` value exactly as found, an empty array when absent
    pub projects: Value,
}

impl ConfigReadResult {
    pub fn from_config(config: Map<String, Value>) -> Self {
        let projects = config
            .get("projects")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Self { config, projects }
    }
}
