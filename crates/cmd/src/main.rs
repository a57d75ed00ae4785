// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::commands::{
    du_command, dump_command, gc_command, init_command, list_command, repair_command,
    restore_command,
};
use cmd::common::get_store_path_with_override;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "folio")]
struct Cli {
    /// Store directory (defaults to $FOLIO)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a store and its reserved folders
    Init,
    /// Print the tree below the root, or below one node
    List {
        /// Start at this node id instead of the root
        #[arg(long)]
        id: Option<String>,
    },
    /// Write a snapshot (one JSON record per line)
    Dump {
        /// Output file, or `-` for stdout
        target: String,
    },
    /// Replace the store's contents with a snapshot
    Restore {
        source: PathBuf,
        /// Records per transaction (defaults to the store's restore_batch_size)
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Total stored size
    Du,
    /// Unlink entries pointing at nodes that no longer exist
    Repair,
    /// Remove attachments that no document references
    Gc {
        /// Report what would be removed without removing it
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();

    let cli = Cli::parse();
    let store = get_store_path_with_override(cli.store)?;
    let mut out = std::io::stdout();

    match &cli.command {
        Commands::Init => init_command(&store, &mut out).await,
        Commands::List { id } => list_command(&store, id.as_deref(), &mut out).await,
        Commands::Dump { target } => dump_command(&store, target, &mut out).await,
        Commands::Restore { source, batch_size } => {
            restore_command(&store, source, *batch_size, &mut out).await
        }
        Commands::Du => du_command(&store, &mut out).await,
        Commands::Repair => repair_command(&store, &mut out).await,
        Commands::Gc { dry_run } => gc_command(&store, *dry_run, &mut out).await,
    }
}
