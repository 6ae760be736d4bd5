//! Registry and preference commands

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use odo_core::preference::Preference;
use odo_core::registry::{DevfileStack, HttpRegistryClient, RegistryClient, StackFilter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct RegistryArgs {
    /// Only show the stack with this name
    #[arg(long)]
    pub devfile: Option<String>,

    /// Only show stacks of this registry
    #[arg(long = "devfile-registry")]
    pub devfile_registry: Option<String>,

    /// Only show stacks whose name, description or architectures contain this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum PreferenceCommand {
    /// Show the configured registries
    View,
    /// Add a setting
    #[command(subcommand)]
    Add(AddCommand),
    /// Remove a setting
    #[command(subcommand)]
    Remove(RemoveCommand),
}

#[derive(Subcommand, Debug)]
pub enum AddCommand {
    /// Add a devfile registry
    Registry {
        name: String,
        url: String,
        /// Mark the registry as secure
        #[arg(long)]
        secure: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemoveCommand {
    /// Remove a devfile registry
    Registry { name: String },
}

pub async fn list_registry(args: RegistryArgs) -> Result<()> {
    let preference = Preference::load()?;
    let client = HttpRegistryClient::new(preference.registries().to_vec(), odo_core::USER_AGENT);
    let filter = StackFilter {
        registry: args.devfile_registry,
        devfile: args.devfile,
        text: args.filter,
    };
    let catalog = client.list_devfile_stacks(&filter).await?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Table => {
            if catalog.items.is_empty() {
                println!("{}", "No devfile stacks found".yellow());
            } else {
                print!("{}", stack_table(&catalog.items));
            }
        }
    }
    Ok(())
}

fn stack_table(stacks: &[DevfileStack]) -> String {
    let name_width = column_width("NAME", stacks.iter().map(|s| s.name.as_str()));
    let registry_width =
        column_width("REGISTRY", stacks.iter().map(|s| s.registry.name.as_str()));

    let mut table = format!(
        "{}\n",
        format!(
            "{:name_width$}  {:registry_width$}  DESCRIPTION",
            "NAME", "REGISTRY"
        )
        .bold()
    );
    for stack in stacks {
        table.push_str(&format!(
            "{:name_width$}  {:registry_width$}  {}\n",
            stack.name, stack.registry.name, stack.description
        ));
    }
    table
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or_default()
}

pub fn preference(command: PreferenceCommand) -> Result<()> {
    let mut preference = Preference::load()?;
    match command {
        PreferenceCommand::View => {
            println!("Preference file: {}", preference.path().display());
            println!();
            println!("{}", "Devfile registries:".bold());
            for registry in preference.registries() {
                let secure = if registry.secure { " (secure)" } else { "" };
                println!("  {}  {}{}", registry.name.cyan(), registry.url, secure);
            }
        }
        PreferenceCommand::Add(AddCommand::Registry { name, url, secure }) => {
            preference.add_registry(&name, &url, secure)?;
            preference.save()?;
            println!("{} New registry successfully added", "✓".green());
        }
        PreferenceCommand::Remove(RemoveCommand::Registry { name }) => {
            preference.remove_registry(&name)?;
            preference.save()?;
            println!("{} Successfully deleted registry {:?}", "✓".green(), name);
        }
    }
    Ok(())
}
