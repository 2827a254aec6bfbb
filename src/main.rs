//! waylay command-line front-end
//!
//! Installs and removes shims (`intercept`, `undo`) and edits the
//! per-tool rewrite rules. Every rule edit loads the stored record,
//! changes exactly one field, and persists it atomically. Exit code is 1
//! on any precondition failure, 0 otherwise.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::io::Read;
use std::process::ExitCode;

use waylay_config::{ConfigStore, ConfigurationRecord};
use waylay_manager::{first_executable, InterceptionManager};

#[derive(Parser, Debug)]
#[command(name = "waylay")]
#[command(version, about = "Intercept commands and rewrite their invocations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install a shim in place of a tool's binary
    Intercept { tool: String },
    /// Remove the shim and restore the original binary
    Undo { tool: String },
    /// Report whether a tool is currently intercepted
    Status { tool: String },
    /// Read a full configuration document from stdin and persist it
    Configure { tool: String },
    /// Print a tool's configuration document
    Show { tool: String },
    /// Open a tool's configuration in an editor
    Edit { tool: String },
    /// Append an argument to every invocation
    Append {
        tool: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Prepend an argument to every invocation
    Prepend {
        tool: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Remove an argument from every invocation
    Disable {
        tool: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Replace one argument with another on every invocation
    Replace {
        tool: String,
        #[arg(allow_hyphen_values = true)]
        from: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
    /// Print the rewritten command line before the tool starts
    Display { tool: String },
    /// Stop printing the rewritten command line
    Hide { tool: String },
    /// Print a notice for each rewrite action taken
    Notify { tool: String },
    /// Stop printing rewrite notices
    Unnotify { tool: String },
    /// Make another name resolve to this tool's configuration
    Link { tool: String, alias: String },
    /// Delete a tool's configuration and write a fresh default
    Reset { tool: String },
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("waylay: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let store = ConfigStore::open_default();
    let manager = InterceptionManager::new(store.clone());

    match cli.command {
        Command::Intercept { tool } => {
            manager.intercept(&tool)?;
            println!("Successfully intercepted {tool}");
        }
        Command::Undo { tool } => {
            manager.undo(&tool)?;
            println!("Successfully unintercepted {tool}");
            println!("Leaving the configuration in place");
        }
        Command::Status { tool } => {
            if manager.is_intercepted(&tool) {
                println!("{tool} is intercepted");
            } else {
                println!("{tool} is NOT intercepted");
            }
        }
        Command::Configure { tool } => {
            manager.assert_intercepted(&tool)?;
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read configuration from stdin")?;
            store.configure_from_json(&tool, &input)?;
            println!("Configuration successfully written");
        }
        Command::Show { tool } => {
            manager.assert_intercepted(&tool)?;
            let canonical = store.resolve(&tool)?;
            let path = store.path_for(&canonical);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            print!("{text}");
        }
        Command::Edit { tool } => {
            manager.assert_intercepted(&tool)?;
            edit_config(&store, &tool)?;
        }
        Command::Append { tool, value } => {
            mutate(&manager, &store, &tool, |r| r.append.push(value))?;
        }
        Command::Prepend { tool, value } => {
            mutate(&manager, &store, &tool, |r| r.prepend.push(value))?;
        }
        Command::Disable { tool, value } => {
            mutate(&manager, &store, &tool, |r| r.disable.push(value))?;
        }
        Command::Replace { tool, from, to } => {
            mutate(&manager, &store, &tool, |r| r.replace.push((from, to)))?;
        }
        Command::Display { tool } => {
            mutate(&manager, &store, &tool, |r| r.display_before_start = true)?;
        }
        Command::Hide { tool } => {
            mutate(&manager, &store, &tool, |r| r.display_before_start = false)?;
        }
        Command::Notify { tool } => {
            mutate(&manager, &store, &tool, |r| r.notify_about_actions = true)?;
        }
        Command::Unnotify { tool } => {
            mutate(&manager, &store, &tool, |r| r.notify_about_actions = false)?;
        }
        Command::Link { tool, alias } => {
            store.link(&tool, &alias)?;
            println!("Linked {alias} to read from {tool}'s configuration");
        }
        Command::Reset { tool } => {
            if store.exists(&tool) {
                store.remove(&tool)?;
            }
            store.save_default(&tool)?;
            println!("Configuration reset");
        }
    }

    Ok(())
}

/// Load, change one field, persist.
fn mutate(
    manager: &InterceptionManager,
    store: &ConfigStore,
    tool: &str,
    apply: impl FnOnce(&mut ConfigurationRecord),
) -> Result<()> {
    manager.assert_intercepted(tool)?;
    let mut record = store.load(tool)?;
    apply(&mut record);
    store.save(tool, &record)?;
    println!("Configuration changed");
    Ok(())
}

fn edit_config(store: &ConfigStore, tool: &str) -> Result<()> {
    let canonical = store.resolve(tool)?;
    let path = store.path_for(&canonical);

    let editor = env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| first_executable("nano").map(|p| p.display().to_string()))
        .or_else(|| first_executable("vi").map(|p| p.display().to_string()))
        .ok_or_else(|| anyhow!("no editor found; set EDITOR"))?;

    let status = std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .with_context(|| format!("failed to launch {editor}"))?;
    if !status.success() {
        bail!("{editor} exited with {status}");
    }
    Ok(())
}
