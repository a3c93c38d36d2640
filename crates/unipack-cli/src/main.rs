use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod associations;
mod commands;
mod confirm;
mod render;


#[derive(Parser, Debug)]
#[command(name = "unipack")]
#[command(about = "Single-device package installer", long_about = None)]
struct Cli {
    /// Install prefix to operate on instead of the per-user default.
    #[arg(long, global = true)]
    prefix: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install a .upk package archive.
    Install {
        archive: PathBuf,
        /// Permit installing over a newer or equal installed version with a
        /// warning instead of the force-installation framing.
        #[arg(long)]
        allow_downgrade: bool,
        /// Answer every confirmation prompt with its proceed option.
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Read a shortcut file and run the program it points at.
    Launch { shortcut: PathBuf },
    /// Create the prefix directories and self-register file associations.
    Init,
    /// List installed packages.
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let layout = commands::resolve_layout(cli.prefix)?;

    match cli.command {
        Commands::Install {
            archive,
            allow_downgrade,
            yes,
        } => commands::run_install(&layout, &archive, allow_downgrade, yes),
        Commands::Launch { shortcut } => {
            let code = commands::run_launch(&shortcut)?;
            std::process::exit(code);
        }
        Commands::Init => commands::run_init(&layout),
        Commands::List => commands::run_list(&layout),
    }
}
