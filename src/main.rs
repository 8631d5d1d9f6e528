//! # Resource Console CLI
//!
//! Drives a single role editor against the identity server from the terminal.
//!
//! ```bash
//! resource-console --config console.toml role 2 show
//! resource-console role 2 edit --name auditor --note "read-only access"
//! resource-console role 2 delete --yes
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use resource_console::clients::{EditorClient, RoleClient};
use resource_console::framework::{SaveOutcome, ViewState};
use resource_console::runtime::{setup_tracing, Console, ConsoleConfig};
use tracing::{info, Instrument};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "resource-console")]
#[command(about = "Inspect and edit identity server resources")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with one role
    Role {
        id: i64,
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand, Debug)]
enum RoleAction {
    /// Print the role and its users
    Show,
    /// Change fields and save
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete the role
    Delete {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    setup_tracing();

    let config = match &args.config {
        Some(path) => ConsoleConfig::load(path),
        None => Ok(ConsoleConfig::default()),
    }
    .and_then(ConsoleConfig::with_env_overrides)
    .map_err(|e| e.to_string())?;

    let console = Console::connect(config).map_err(|e| e.to_string())?;
    let timeout = console.config().request_timeout() + Duration::from_secs(1);

    let Command::Role { id, action } = args.command;
    let editor = console.open_role(id);
    let span = tracing::info_span!("role", role_id = id);
    let result = run_role(&console, &editor.client, action, timeout)
        .instrument(span)
        .await;

    editor.shutdown().await.map_err(|e| e.to_string())?;
    result
}

async fn run_role(
    console: &Console,
    client: &RoleClient,
    action: RoleAction,
    timeout: Duration,
) -> Result<(), String> {
    // A failed read leaves the editor in Loading and raises the banner instead.
    let mut banner = console.errors().subscribe();
    let loaded = tokio::select! {
        loaded = client.wait_loaded(timeout) => loaded.map_err(|e| e.to_string())?,
        _ = banner.wait_for(Option::is_some) => {
            return report_errors(console);
        }
    };
    if loaded.ready().is_none() {
        report_errors(console)?;
        return Err(format!("role {} not found", client.id()));
    }

    match action {
        RoleAction::Show => {}
        RoleAction::Edit { name, note } => {
            if let Some(name) = name {
                client.set_name(&name).await.map_err(|e| e.to_string())?;
            }
            if let Some(note) = note {
                client.set_note(&note).await.map_err(|e| e.to_string())?;
            }
            match client.save().await.map_err(|e| e.to_string())? {
                SaveOutcome::Submitted => {
                    client.wait_settled(timeout).await.map_err(|e| e.to_string())?;
                }
                SaveOutcome::Invalid(errors) => {
                    print_view(&client.view(console.config()));
                    return Err(format!("not saved: {errors}"));
                }
                SaveOutcome::Ignored => info!("Nothing to save"),
            }
        }
        RoleAction::Delete { yes } => {
            client.delete().await.map_err(|e| e.to_string())?;
            if !yes {
                client.cancel().await.map_err(|e| e.to_string())?;
                return Err("refusing to delete without --yes".to_string());
            }
            client.confirm().await.map_err(|e| e.to_string())?;
            client.wait_settled(timeout).await.map_err(|e| e.to_string())?;
        }
    }

    report_errors(console)?;
    let view = client.view(console.config());
    if view.navigate_away {
        println!("role {} deleted", client.id());
    } else {
        print_view(&view);
    }
    Ok(())
}

fn report_errors(console: &Console) -> Result<(), String> {
    match console.errors().dismiss() {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

fn print_view(view: &ViewState) {
    for field in &view.fields {
        match field.error {
            Some(error) => println!("{:<6} {:?}  ! {error}", field.name, field.value),
            None => println!("{:<6} {:?}", field.name, field.value),
        }
    }
    if !view.members.is_empty() {
        println!("members:");
        for member in &view.members {
            println!("  {member}");
        }
    }
    println!("directory: {} users", view.directory.len());
}
