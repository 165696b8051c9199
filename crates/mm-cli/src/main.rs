//! `matmake`: the command-line front-end over mm-core/mm-sched/mm-parser
//! (spec's CLI surface, grounded on `wf-cli`'s clap layout and `wf-proj`'s
//! per-subcommand `cmd_*::run()` modules).

mod cmd_build;
mod cmd_clean;
mod cmd_depfile;
mod cmd_init;
mod cmd_list;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::{ProfileChoice, ToolConfig};

#[derive(Parser)]
#[command(name = "matmake", about = "Parallel C/C++ build engine")]
struct Cli {
    /// Path to the Matmakefile to read
    #[arg(short, long, default_value = "Matmakefile", global = true)]
    file: PathBuf,

    /// Path to the optional tool config file
    #[arg(long, default_value = ".matmake.toml", global = true)]
    config: PathBuf,

    /// Use MSVC flag translation instead of GCC
    #[arg(long, global = true)]
    msvc: bool,

    /// Number of worker threads (defaults to available parallelism)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Print each rule's command instead of a progress bar
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one or more targets (all targets if none given)
    Build {
        /// Target names to build; builds everything when empty
        targets: Vec<String>,
    },

    /// Remove every target's built output and dep-file
    Clean,

    /// Clean then build
    Rebuild {
        targets: Vec<String>,
    },

    /// List every declared target plus the synthetic `clean` pseudo-target
    List,

    /// Scaffold a starter Matmakefile in the current directory
    Init,

    /// Dump a GCC-style `.d` dep-file's headers and recorded command
    Depfile {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let tool_config = ToolConfig::load_optional(&cli.config)?;

    let log_level = if cli.verbose { "debug" } else { tool_config.log_level.as_str() };
    logging::init(log_level)?;

    let profile = if cli.msvc { ProfileChoice::Msvc } else { tool_config.profile };
    let threads = cli.threads.unwrap_or(tool_config.threads);
    let verbose = cli.verbose || tool_config.verbose;

    match cli.command {
        Commands::Build { targets } => cmd_build::run(&cli.file, &targets, profile, threads, verbose)?,
        Commands::Clean => cmd_clean::run(&cli.file, profile)?,
        Commands::Rebuild { targets } => {
            cmd_clean::run(&cli.file, profile)?;
            cmd_build::run(&cli.file, &targets, profile, threads, verbose)?;
        }
        Commands::List => cmd_list::run(&cli.file)?,
        Commands::Init => cmd_init::run(&cli.file)?,
        Commands::Depfile { path } => cmd_depfile::run(&path)?,
    }

    Ok(())
}
