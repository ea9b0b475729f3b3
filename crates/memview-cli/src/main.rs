use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use memview::{Address, GameVersion};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::address::parse_address;

#[derive(Parser)]
#[command(name = "memview")]
#[command(about = "Inspect game memory snapshots through typed views")]
struct Args {
    #[arg(short, long, default_value = "memview.toml", env = "MEMVIEW_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the live party roster
    Party {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Game version, overrides the config file
        #[arg(short, long)]
        version: Option<GameVersion>,

        /// Roster address (hex, `base+offset` allowed); skips signature scanning
        #[arg(short, long, value_parser = parse_address)]
        address: Option<Address>,

        /// Show the replay roster
        #[arg(long)]
        replay: bool,

        /// Print members as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the offset tables selected for a game version
    Layout {
        #[arg(short, long)]
        version: GameVersion,

        /// Write one JSON file per table into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Dump raw bytes from a snapshot
    Hexdump {
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Start address (hex, `base+offset` allowed)
        #[arg(short, long, value_parser = parse_address)]
        address: Address,

        #[arg(short, long, default_value_t = 256)]
        len: usize,

        /// Hide the ASCII column
        #[arg(long)]
        no_ascii: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("memview=info".parse()?))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Party {
            snapshot,
            version,
            address,
            replay,
            json,
        } => {
            let mut config = config::load_config(&args.config)?;
            if version.is_some() {
                config.version = version;
            }
            if let Some(version) = &config.version {
                info!("Using layout for version {}", version);
            }
            let options = commands::party::PartyOptions {
                snapshot: &snapshot,
                address,
                replay,
                json,
            };
            commands::party::run(&options, &config)
        }
        Command::Layout { version, output } => commands::layout::run(&version, output.as_deref()),
        Command::Hexdump {
            snapshot,
            address,
            len,
            no_ascii,
        } => commands::hexdump::run(&snapshot, address, len, !no_ascii),
    }
}
