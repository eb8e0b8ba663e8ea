use clap::Parser;
use colored::{ColoredString, Colorize};
use serde_json::{Value, json};
use std::io::{self, Write};

use ccenv::error::CliError;
use ccenv::{Context, DataFacade, Discovery, FacadeKind, ProjectEntry};
use tracing_subscriber::EnvFilter;

/// List the Claude configs reachable from this machine
#[derive(Debug, Parser)]
#[command(name = "ccenv", version)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also show this dotted config key for each environment, e.g. `settings.theme`
    #[arg(long, value_name = "DOTTED_KEY")]
    key: Option<String>,

    /// Show context files (CLAUDE.md etc.) for each project
    #[arg(long)]
    context_files: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

struct Report {
    facade_json: Value,
    lines: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Distro probing fans out on the rayon pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_cpus::get())
        .thread_name(|i| format!("ccenv-worker-{}", i))
        .build_global()?;

    if cli.no_color || cli.json {
        colored::control::set_override(false);
    }

    let discovery = Discovery::new(Context::from_system());
    let facades = discovery.discover_all().await;

    let mut reports = Vec::with_capacity(facades.len());
    for facade in &facades {
        reports.push(report(facade, &cli).await);
    }

    let mut stdout = io::stdout().lock();
    if cli.json {
        let all: Vec<Value> = reports.into_iter().map(|r| r.facade_json).collect();
        serde_json::to_writer_pretty(&mut stdout, &all)?;
        writeln!(stdout)?;
    } else if reports.is_empty() {
        writeln!(stdout, "{} No Claude config found", "✗".red())?;
    } else {
        for report in reports {
            for line in report.lines {
                writeln!(stdout, "{line}")?;
            }
        }
    }

    Ok(())
}

async fn report(facade: &DataFacade, cli: &Cli) -> Report {
    let info = facade.environment_info();
    let projects = facade.get_projects().await;
    let value = match &cli.key {
        Some(key) => facade.get_global_config(key).await,
        None => None,
    };

    let mut lines = vec![format!(
        "{} {} {}",
        "●".green(),
        info.label().bold(),
        info.config_path.dimmed()
    )];
    if let Some(key) = &cli.key {
        let shown = value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(unset)".to_string());
        lines.push(format!("  {} = {}", key.cyan(), shown));
    }
    lines.push(format!("  {} project(s)", projects.len()));

    let mut project_json = Vec::with_capacity(projects.len());
    for project in &projects {
        lines.push(format!("    {} {}{}", project.name().bold(), project.path, badges(project)));

        let mut entry = json!(project);
        if cli.context_files {
            let files = facade.get_project_context_files(&project.path).await;
            // Across a boundary the candidates are unchecked, so only list native ones
            if facade.kind() == FacadeKind::Native {
                for file in &files {
                    lines.push(format!("      {}", file.dimmed()));
                }
            }
            entry["contextFiles"] = json!(files);
        }
        project_json.push(entry);
    }

    let mut facade_json = json!({
        "environment": info,
        "projects": project_json,
    });
    if cli.key.is_some() {
        facade_json["value"] = value.unwrap_or(Value::Null);
    }

    Report { facade_json, lines }
}

fn badges(project: &ProjectEntry) -> String {
    let mut parts: Vec<ColoredString> = Vec::new();
    if let Some(state) = &project.state {
        if state.trust {
            parts.push("trusted".green());
        }
        if !state.allowed_tools.is_empty() {
            parts.push(format!("tools: {}", state.allowed_tools.join(", ")).yellow());
        }
    }
    if let Some(servers) = &project.mcp_servers {
        parts.push(format!("mcp: {}", servers.len()).magenta());
    }

    if parts.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        format!("  [{}]", joined.join(" | "))
    }
}
