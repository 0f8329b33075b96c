//! Client commands and resolution of the client a command acts on.
//!
//! The selected client is kept in a small JSON state file so that `logs` and
//! `report` can default to it between invocations.

use std::path::Path;

use clap::Subcommand;
use uuid::Uuid;
use xopt_core::{AppContext, Client};

#[derive(Debug, Subcommand)]
pub enum ClientsCommands {
    /// List clients; the selected one is marked with `*`
    List,
    /// Register a client
    Add {
        #[arg(long)]
        name: String,
        /// X handle, with or without the leading `@`
        #[arg(long)]
        handle: Option<String>,
    },
    /// Make a client the default for other commands
    Select { id: Uuid },
    /// Show the selected client
    Current,
    /// Forget the selection
    Clear,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    state_path: &Path,
    command: ClientsCommands,
) -> anyhow::Result<()> {
    match command {
        ClientsCommands::List => run_clients_list(pool, state_path).await,
        ClientsCommands::Add { name, handle } => {
            run_clients_add(pool, &name, handle.as_deref()).await
        }
        ClientsCommands::Select { id } => run_clients_select(pool, state_path, id).await,
        ClientsCommands::Current => run_clients_current(pool, state_path).await,
        ClientsCommands::Clear => run_clients_clear(state_path),
    }
}

fn handle_display(client: &Client) -> String {
    client
        .x_handle
        .as_deref()
        .map_or_else(|| "\u{2014}".to_string(), |h| format!("@{h}"))
}

async fn run_clients_list(pool: &sqlx::PgPool, state_path: &Path) -> anyhow::Result<()> {
    let clients = xopt_db::list_clients(pool).await?;
    if clients.is_empty() {
        println!("no clients yet; run `clients add --name <name>` first");
        return Ok(());
    }

    let context = AppContext::load(state_path)?;
    println!("  {:<38}{:<20}NAME", "ID", "HANDLE");
    for client in &clients {
        let marker = if context.selected_client_id == Some(client.id) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:<38}{:<20}{}",
            client.id,
            handle_display(client),
            client.name
        );
    }
    Ok(())
}

async fn run_clients_add(
    pool: &sqlx::PgPool,
    name: &str,
    handle: Option<&str>,
) -> anyhow::Result<()> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > 200 {
        anyhow::bail!("client name must be 1\u{2013}200 characters");
    }
    let handle = handle
        .map(|h| h.trim().trim_start_matches('@'))
        .filter(|h| !h.is_empty());

    let client = xopt_db::create_client(pool, name, handle, None).await?;
    tracing::info!(client_id = %client.id, "client created");
    println!("created {} ({})", client.name, client.id);
    Ok(())
}

async fn run_clients_select(
    pool: &sqlx::PgPool,
    state_path: &Path,
    id: Uuid,
) -> anyhow::Result<()> {
    let client = xopt_db::get_client(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("client '{id}' not found"))?;

    let mut context = AppContext::load(state_path)?;
    context.select(client.id);
    context.save(state_path)?;
    println!("selected {} ({})", client.name, client.id);
    Ok(())
}

async fn run_clients_current(pool: &sqlx::PgPool, state_path: &Path) -> anyhow::Result<()> {
    let context = AppContext::load(state_path)?;
    let clients = xopt_db::list_clients(pool).await?;
    match context.selected(&clients) {
        Some(client) => println!("{} {} ({})", client.name, handle_display(client), client.id),
        None if context.selected_client_id.is_some() => {
            println!("selected client no longer exists; run `clients select <id>`");
        }
        None => println!("no client selected"),
    }
    Ok(())
}

pub(crate) fn run_clients_clear(state_path: &Path) -> anyhow::Result<()> {
    let mut context = AppContext::load(state_path)?;
    context.clear();
    context.save(state_path)?;
    println!("selection cleared");
    Ok(())
}

/// The client named by `--client`, or else the persisted selection.
///
/// # Errors
///
/// Returns an error if neither is available or the client does not exist.
pub(crate) async fn resolve_client(
    pool: &sqlx::PgPool,
    state_path: &Path,
    flag: Option<Uuid>,
) -> anyhow::Result<Client> {
    let id = match flag {
        Some(id) => id,
        None => AppContext::load(state_path)?
            .selected_client_id
            .ok_or_else(|| {
                anyhow::anyhow!("no client selected; pass --client or run `clients select <id>`")
            })?,
    };
    xopt_db::get_client(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("client '{id}' not found"))
}
