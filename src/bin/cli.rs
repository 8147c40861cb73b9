//! abchain CLI
//!
//! Command-line interface for a file-backed ABC index.

use std::path::{Path, PathBuf};

use abchain::descriptor;
use abchain::{Config, FileSpace, Index, Result, SyncStrategy};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// abchain CLI
#[derive(Parser, Debug)]
#[command(name = "abchain-cli")]
#[command(about = "Accelerated Bisectional Chains index tool")]
#[command(version)]
struct Args {
    /// Index file (layout is kept in `<file>.layout`)
    #[arg(short, long, default_value = "./index.abc")]
    file: PathBuf,

    /// fsync every written block instead of once per command
    #[arg(long)]
    sync_every_write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an empty index and record its layout
    Init {
        /// Address width in bytes
        #[arg(long, default_value = "5")]
        asize: u8,

        /// Value width in bytes
        #[arg(long, default_value = "8")]
        isize: u8,

        /// Fan-out of non-leaf maps
        #[arg(long, default_value = "99")]
        dist: u8,

        /// Fan-out of leaf maps
        #[arg(long, default_value = "62")]
        idist: u8,
    },

    /// Append ascending values at the tail
    Append {
        /// Values, each greater than the current last one
        #[arg(required = true)]
        values: Vec<u64>,
    },

    /// Insert values at their sorted positions
    Insert {
        #[arg(required = true)]
        values: Vec<u64>,
    },

    /// Look up a value exactly
    Find {
        value: u64,
    },

    /// Find the greatest value not above the target
    Seek {
        value: u64,
    },

    /// Print values in order
    Scan {
        /// Descending order
        #[arg(short, long)]
        reverse: bool,

        /// Stop after this many values
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Verify the structure and print its shape
    Stats,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,abchain=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let sync = if args.sync_every_write {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::Manual
    };

    if let Commands::Init {
        asize,
        isize,
        dist,
        idist,
    } = args.command
    {
        let config = Config::builder()
            .address_width(asize)
            .value_width(isize)
            .fanout(dist)
            .leaf_fanout(idist)
            .build()?;
        return init(&args.file, config, sync);
    }

    let config = descriptor::load(&descriptor::sidecar_path(&args.file))?;
    let mut index = Index::open(FileSpace::open(&args.file, sync)?, config)?;

    match args.command {
        // Handled before the index is opened
        Commands::Init { .. } => {}
        Commands::Append { values } => {
            for value in values {
                index.append(value)?;
            }
        }
        Commands::Insert { values } => {
            for value in values {
                index.insert(value)?;
            }
        }
        Commands::Find { value } => match index.find(value)? {
            Some(entry) => println!("{} @ {:#x}[{}]", entry.value, entry.address, entry.position),
            None => println!("(not found)"),
        },
        Commands::Seek { value } => match index.seek(value, |v, t| v.cmp(&t))? {
            Some(entry) => println!("{} @ {:#x}[{}]", entry.value, entry.address, entry.position),
            None => println!("(before first)"),
        },
        Commands::Scan { reverse, limit } => {
            let scan = if reverse { index.iter_rev()? } else { index.iter()? };
            for entry in scan.take(limit.unwrap_or(usize::MAX)) {
                println!("{}", entry?.value);
            }
        }
        Commands::Stats => {
            let stats = index.verify()?;
            println!("layers: {}", stats.layers);
            println!("values: {}", stats.values);
            for (level, maps) in stats.maps_per_level.iter().enumerate() {
                println!("level {}: {} maps", level, maps);
            }
        }
    }

    index.flush()
}

fn init(path: &Path, config: Config, sync: SyncStrategy) -> Result<()> {
    descriptor::create(path, &config)?;
    let index = Index::open(FileSpace::open(path, sync)?, config)?;
    index.flush()?;

    tracing::info!("Initialized {}", path.display());
    Ok(())
}
