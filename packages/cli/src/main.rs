mod commands;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{GenerateArgs, InitArgs, ServeArgs, SlotArgs, SlotsArgs};
use project::Project;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pagesmith CLI - compose pages from blocks and generate their source
#[derive(Parser, Debug)]
#[command(name = "pagesmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Project directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    /// Storage directory (overrides config)
    #[arg(long, global = true)]
    storage_dir: Option<String>,

    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagesmith project
    Init(InitArgs),

    /// List slots
    Slots(SlotsArgs),

    /// Print a slot's stored blocks
    Show(SlotArgs),

    /// Generate a slot's source
    Generate(GenerateArgs),

    /// Replace a slot with its built-in default
    Reset(SlotArgs),

    /// Delete a slot's file
    Delete(SlotArgs),

    /// List a slot's backups
    Backups(SlotArgs),

    /// Serve the builder API
    Serve(ServeArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let project = Project::load(&cli.project, cli.storage_dir)?;

    match cli.command {
        Command::Init(args) => commands::init(args, project),
        Command::Slots(args) => commands::list_slots(args, &project),
        Command::Show(args) => commands::show(&args.slot, &project),
        Command::Generate(args) => commands::generate(args, &project),
        Command::Reset(args) => commands::reset(args, &project),
        Command::Delete(args) => commands::delete(&args.slot, &project),
        Command::Backups(args) => commands::backups(&args.slot, &project),
        Command::Serve(args) => commands::serve(args, project),
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
