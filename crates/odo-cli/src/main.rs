//! odo CLI - Bootstrap devfile components

mod commands;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use odo_core::init::InitFlags;
use odo_core::tui::InitArgs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "odo")]
#[command(about = "CLI for bootstrapping devfile components")]
#[command(version)]
pub struct Args {
    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bootstrap a new component in the current directory
    Init(CliInitArgs),
    /// List the devfile stacks of the configured registries
    Registry(commands::RegistryArgs),
    /// View and modify preferences
    #[command(subcommand)]
    Preference(commands::PreferenceCommand),
}

#[derive(Parser, Debug, Default)]
pub struct CliInitArgs {
    /// Name of the component to create
    #[arg(long)]
    pub name: Option<String>,

    /// Name of the devfile stack in the registry
    #[arg(long)]
    pub devfile: Option<String>,

    /// Registry to take the devfile from
    #[arg(long = "devfile-registry")]
    pub devfile_registry: Option<String>,

    /// Version of the devfile stack
    #[arg(long = "devfile-version")]
    pub devfile_version: Option<String>,

    /// Starter project to download
    #[arg(long)]
    pub starter: Option<String>,

    /// Path or URL of a devfile
    #[arg(long = "devfile-path")]
    pub devfile_path: Option<String>,

    /// Component directory (defaults to the current directory)
    #[arg(long, hide = true)]
    pub directory: Option<PathBuf>,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            flags: InitFlags {
                name: args.name,
                devfile: args.devfile,
                devfile_registry: args.devfile_registry,
                devfile_version: args.devfile_version,
                starter: args.starter,
                devfile_path: args.devfile_path,
            },
            directory: args.directory,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    odo_core::logging::init(args.verbose);

    match args.command {
        Some(Command::Registry(registry_args)) => commands::list_registry(registry_args).await,
        Some(Command::Preference(command)) => commands::preference(command),
        Some(Command::Init(init_args)) => run_init(init_args.into()).await,
        // No subcommand provided, default to interactive init
        None => run_init(InitArgs::default()).await,
    }
}

async fn run_init(args: InitArgs) -> Result<()> {
    let result = odo_core::run_init(args).await;

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
