//! Reconciles the two shapes the `projects` field has had over time.
//!
//! Older configs store an array of `{ "path": ... }` objects. Newer ones
//! store a record keyed by project path whose values hold per-project state
//! (`allowedTools`, `hasTrustDialogAccepted`, `mcpServers`). Both collapse
//! into one list of [`ProjectEntry`]. Malformed entries are dropped, never
//! reported.

use crate::types::{McpServerConfig, ProjectEntry, ProjectState};
use crate::utils::paths::{is_unc_path, is_windows_drive_path};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Normalize a raw `projects` value. Anything other than an array or an
/// object yields an empty list.
pub fn normalize_projects(projects: &Value) -> Vec<ProjectEntry> {
    match projects {
        Value::Array(items) => items.iter().filter_map(from_array_item).collect(),
        Value::Object(record) => record
            .iter()
            .filter_map(|(key, value)| from_record_entry(key, value))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!(kind = json_kind(other), "Ignoring projects value of unexpected type");
            Vec::new()
        }
    }
}

fn from_array_item(item: &Value) -> Option<ProjectEntry> {
    let fields = item.as_object()?;
    let path = fields.get("path")?.as_str()?;
    Some(build_entry(path, fields))
}

fn from_record_entry(key: &str, value: &Value) -> Option<ProjectEntry> {
    let fields = value.as_object()?;

    if let Some(path) = fields.get("path").and_then(Value::as_str) {
        return Some(build_entry(path, fields));
    }

    if looks_absolute(key) {
        Some(build_entry(key, fields))
    } else {
        debug!(key, "Skipping project record without a usable path");
        None
    }
}

/// Keys written on POSIX start with `/` or `~`; keys written on Windows are
/// drive or UNC paths.
fn looks_absolute(key: &str) -> bool {
    key.starts_with('/') || key.starts_with('~') || is_windows_drive_path(key) || is_unc_path(key)
}

fn build_entry(path: &str, fields: &Map<String, Value>) -> ProjectEntry {
    ProjectEntry {
        path: path.to_string(),
        state: extract_state(fields),
        mcp_servers: extract_mcp_servers(fields),
    }
}

fn extract_state(fields: &Map<String, Value>) -> Option<ProjectState> {
    // Array entries may already carry a nested state object
    if let Some(state) = fields.get("state").and_then(Value::as_object) {
        return Some(ProjectState {
            allowed_tools: string_list(state.get("allowedTools")),
            trust: state.get("trust").and_then(Value::as_bool).unwrap_or(false),
        });
    }

    let tools = fields.get("allowedTools");
    let trust = fields.get("hasTrustDialogAccepted");
    if tools.is_none() && trust.is_none() {
        return None;
    }

    Some(ProjectState {
        allowed_tools: string_list(tools),
        trust: trust.and_then(Value::as_bool).unwrap_or(false),
    })
}

fn extract_mcp_servers(fields: &Map<String, Value>) -> Option<BTreeMap<String, McpServerConfig>> {
    let servers = fields.get("mcpServers")?.as_object()?;

    let parsed: BTreeMap<String, McpServerConfig> = servers
        .iter()
        .filter_map(|(name, config)| {
            match serde_json::from_value::<McpServerConfig>(config.clone()) {
                Ok(config) => Some((name.clone(), config)),
                Err(err) => {
                    debug!(server = %name, error = %err, "Skipping malformed MCP server");
                    None
                }
            }
        })
        .collect();

    if parsed.is_empty() { None } else { Some(parsed) }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
