//! `todolists` command-line entry point.
//!
//! # Responsibility
//! - `serve` boots storage, logging and the RPC server from configuration.
//! - `create`, `get`, `delete` and `list` call a running server for manual
//!   testing and print the reply as JSON.

use clap::{Parser, Subcommand};
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use todolists_core::{
    init_logging, ServiceConfig, SqliteListRepository, Status, StorageHandle, TodoListService,
};
use todolists_rpc::{serve, ServerOptions, TodoListsClient};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "todolists", version, about = "TodoLists RPC service and client")]
struct Cli {
    /// Configuration file (TOML); falls back to `TODOLISTS_CONFIG`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server address for client commands; defaults to the configured one.
    #[arg(short, long, global = true)]
    addr: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the server until interrupted.
    Serve,
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// Create a list with a unique name.
    Create { name: String },
    /// Fetch a list by id.
    Get { id: i64 },
    /// Delete a list by id.
    Delete { id: i64 },
    /// Fetch one page of lists.
    List {
        #[arg(allow_negative_numbers = true)]
        page_number: i64,
        #[arg(allow_negative_numbers = true)]
        page_size: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match ServiceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("todolists: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Serve => run_server(&config),
        Command::Client(command) => {
            let address = cli.addr.unwrap_or_else(|| config.listen_address());
            run_client(address, command)
        }
    }
}

fn run_server(config: &ServiceConfig) -> ExitCode {
    if let Err(err) = init_logging(&config.logging.level, config.logging.dir.as_deref()) {
        eprintln!("todolists: logging init failed: {err}");
        return ExitCode::FAILURE;
    }

    let handle = match StorageHandle::open(&config.storage.path, config.storage.pool_options()) {
        Ok(handle) => handle,
        Err(err) => {
            error!("event=serve module=cli status=error stage=open_storage error={err}");
            eprintln!("todolists: failed to open storage: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = handle.create_schema() {
        error!("event=serve module=cli status=error stage=create_schema error={err}");
        eprintln!("todolists: failed to prepare schema: {err}");
        return ExitCode::FAILURE;
    }

    let service = TodoListService::new(
        SqliteListRepository::new(handle),
        config.pagination.limits(),
    );
    let options = ServerOptions {
        address: config.listen_address(),
        workers: config.server.workers,
    };
    let server = match serve(&options, Arc::new(service)) {
        Ok(server) => server,
        Err(err) => {
            error!("event=serve module=cli status=error stage=bind error={err}");
            eprintln!("todolists: failed to listen on {}: {err}", options.address);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=serve module=cli status=ready address={} database={}",
        server.local_addr(),
        config.storage.path.display()
    );
    println!("todolists listening on {}", server.local_addr());
    server.wait();
    ExitCode::SUCCESS
}

fn run_client(address: String, command: ClientCommand) -> ExitCode {
    let mut client = TodoListsClient::new(address).with_timeout(CLIENT_TIMEOUT);
    let outcome = match command {
        ClientCommand::Create { name } => client.create(&name).and_then(|reply| render(&reply)),
        ClientCommand::Get { id } => client.get(id).and_then(|reply| render(&reply)),
        ClientCommand::Delete { id } => client.delete(id).and_then(|reply| render(&reply)),
        ClientCommand::List {
            page_number,
            page_size,
        } => client
            .list(page_number, page_size)
            .and_then(|reply| render(&reply)),
    };

    match outcome {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(status) => {
            eprintln!("{status}");
            ExitCode::FAILURE
        }
    }
}

fn render<T: Serialize>(reply: &T) -> Result<String, Status> {
    serde_json::to_string_pretty(reply)
        .map_err(|err| Status::internal(format!("failed to render reply: {err}")))
}
