//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::browse;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{FlatNode, Position, TreeStore};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::render_tree;
use crate::util::path::resolve_against;

pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { root }) => cmd_show(cli, container, root.as_deref()),
        Some(Commands::Flat { root }) => cmd_flat(cli, container, root.as_deref()),
        Some(Commands::Find { id }) => cmd_find(cli, container, id),
        Some(Commands::Summary { json }) => cmd_summary(cli, container, *json),
        Some(Commands::Downline { query, json }) => {
            cmd_downline(cli, container, query.as_deref(), *json)
        }
        Some(Commands::Validate { path }) => cmd_validate(cli, container, path),
        Some(Commands::Browse) => cmd_browse(cli, container),
        Some(Commands::Config { command }) => cmd_config(cli, container, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given (try 'matrixnet --help')".to_string(),
        )),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("get current directory", e).into()),
    }
}

/// `--file`, else the configured `tree_file`, relative to the project directory.
fn tree_file(cli: &Cli, container: &ServiceContainer) -> CliResult<PathBuf> {
    let file = container.network.resolve_tree_file(cli.file.as_deref())?;
    Ok(resolve_against(&project_dir(cli)?, &file))
}

fn load_store(cli: &Cli, container: &ServiceContainer) -> CliResult<Arc<TreeStore>> {
    let path = tree_file(cli, container)?;
    Ok(container.network.load(&path)?)
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "encode json".to_string(),
            source: Box::new(e),
        }
        .into()
    })
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_show(cli: &Cli, container: &ServiceContainer, root: Option<&str>) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let navigator = container.network.view(Arc::clone(&store), root)?;
    let view = navigator.current_view()?;
    output::info(&render_tree(&view, store.max_arity()));
    Ok(())
}

/// Indented line for a flattened node: slot name, then the tooltip text.
pub fn flat_line(node: &FlatNode, arity: usize) -> String {
    let slot = node
        .slot
        .and_then(|slot| Position::from_slot(slot, arity))
        .map(|p| format!("{p}: "))
        .unwrap_or_default();
    format!(
        "{}{}{} [{}]",
        "  ".repeat(node.depth),
        slot,
        node.describe(),
        node.id
    )
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_flat(cli: &Cli, container: &ServiceContainer, root: Option<&str>) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let navigator = container.network.view(Arc::clone(&store), root)?;
    for node in navigator.flatten()? {
        output::info(&flat_line(&node, store.max_arity()));
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_find(cli: &Cli, container: &ServiceContainer, id: &str) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let lookup = container.network.find(&store, id)?;
    let member = &lookup.member;

    output::header(&member.describe());
    output::detail(&format!("id: {}", member.id));
    output::detail(&format!(
        "package: {}  status: {}",
        output::tier(member.package_tier, 0),
        output::status(member.status, 0)
    ));
    output::detail(&format!("path: {}", lookup.path.iter().join(" > ")));
    output::detail(&format!(
        "children: {}",
        member.children.iter().filter(|c| !c.is_empty_slot()).count()
    ));
    output::detail(&format!("downline: {}", lookup.team_size));
    output::detail(&format!("point value: {}", member.point_value));
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_summary(cli: &Cli, container: &ServiceContainer, json: bool) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let report = container.network.report(store)?;
    if json {
        output::info(&to_json(&report)?);
        return Ok(());
    }

    let network = &report.network;
    output::header("Network");
    output::detail(&format!("team size: {}", network.team_size));
    output::detail(&format!("direct referrals: {}", network.direct_referrals));
    output::detail(&format!("active legs: {}", network.active_legs));
    output::detail(&format!(
        "rank: {}",
        network.rank.as_deref().unwrap_or("—")
    ));
    match &network.next_rank {
        Some(next) => output::detail(&format!(
            "next rank: {} ({}%)",
            next, network.rank_progress
        )),
        None => output::detail("next rank: — (top of ladder)"),
    }

    let cpv = &report.cpv;
    output::header(&format!("CPV ({})", cpv.cycle));
    output::detail(&format!("personal: {}", cpv.personal_cpv));
    output::detail(&format!(
        "team: {} / {} ({}%)",
        cpv.team_cpv, cpv.required_cpv, cpv.percentage
    ));
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_downline(
    cli: &Cli,
    container: &ServiceContainer,
    query: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let entries = container.network.downline(store, query)?;
    if json {
        output::info(&to_json(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::warning("no matching members");
        return Ok(());
    }
    for entry in &entries {
        output::info(&format!(
            "{:<12} {:<20} {} L{:<3} {} direct {:<3} team {}",
            entry.id.as_str(),
            entry.display_name,
            output::tier(entry.package_tier, 8),
            entry.depth,
            output::status(entry.status, 8),
            entry.direct_count,
            entry.team_size
        ));
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_validate(cli: &Cli, container: &ServiceContainer, path: &Path) -> CliResult<()> {
    let path = resolve_against(&project_dir(cli)?, path);
    let store = container.network.load(&path)?;
    output::success(&format!(
        "{}: {} nodes, height {}, max arity {}",
        path.display(),
        store.node_count()?,
        store.height()?,
        store.max_arity()
    ));
    Ok(())
}

#[instrument(level = "debug", skip(cli, container))]
fn cmd_browse(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let store = load_store(cli, container)?;
    let mut navigator = container.network.view(store, None)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    browse::run_session(&mut navigator, stdin.lock(), &mut stdout)
}

fn cmd_config(cli: &Cli, container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(&project_dir(cli)?)
            };
            debug!("config init: {}", path.display());
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|()| container.fs.write(&path, &Settings::template()))
                .map_err(|source| CliError::CannotCreate {
                    path: path.clone(),
                    source,
                })?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path();
            let local = local_config_path(&project_dir(cli)?);
            match global {
                Some(path) => output::detail(&format!(
                    "global: {}{}",
                    path.display(),
                    exists_marker(container, &path)
                )),
                None => output::detail("global: (no config directory)"),
            }
            output::detail(&format!(
                "local:  {}{}",
                local.display(),
                exists_marker(container, &local)
            ));
            Ok(())
        }
    }
}

fn exists_marker(container: &ServiceContainer, path: &Path) -> &'static str {
    if container.fs.is_file(path) {
        ""
    } else {
        " (not found)"
    }
}
