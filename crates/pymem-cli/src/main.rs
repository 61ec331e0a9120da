use anyhow::Result;
use clap::{Parser, Subcommand};
use pymem_core::Error;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pymem")]
#[command(about = "CPython process memory string inspector", version)]
struct Args {
    /// Run in debug mode
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the readable memory regions of a process
    Regions {
        /// Process ID (requires root privileges for foreign processes)
        #[arg(short, long)]
        pid: u32,

        /// Print regions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a unicode string object at an address
    Inspect {
        /// Process ID (requires root privileges for foreign processes)
        #[arg(short, long)]
        pid: u32,

        /// Virtual address of the object, hex (0x-prefixed) or decimal
        #[arg(short, long, value_parser = parse_address)]
        address: u64,

        /// Print the decoded object as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a legacy bytes-string object at an address
    InspectBytes {
        /// Process ID (requires root privileges for foreign processes)
        #[arg(short, long)]
        pid: u32,

        /// Virtual address of the object, hex (0x-prefixed) or decimal
        #[arg(short, long, value_parser = parse_address)]
        address: u64,

        /// Print the decoded object as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_address(raw: &str) -> std::result::Result<u64, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| format!("invalid address: {raw}"))
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug {
        "pymem=debug,pymem_core=debug"
    } else {
        "pymem=info,pymem_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Err(e) = run(args) {
        if let Some(Error::PermissionDenied { .. }) = e.downcast_ref::<Error>() {
            eprintln!("Please run with root privileges to read process memory");
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Regions { pid, json } => commands::regions::run(pid, json),
        Command::Inspect { pid, address, json } => commands::inspect::run(pid, address, json),
        Command::InspectBytes { pid, address, json } => {
            commands::inspect_bytes::run(pid, address, json)
        }
    }
}
