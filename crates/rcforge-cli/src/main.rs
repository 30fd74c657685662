//! rcforge - command-line editor for RC0 memory and system files.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::Context;

#[derive(Parser)]
#[command(name = "rcforge")]
#[command(author, version, about = "Inspect and edit RC0 loop-station files", long_about = None)]
struct Cli {
    /// Directory of schema definitions replacing the built-in set
    #[arg(long, global = true, value_name = "DIR")]
    schema_dir: Option<PathBuf>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the fields of a record
    Show(commands::show::ShowArgs),

    /// Set one field
    Set(commands::set::SetArgs),

    /// Rename a memory
    Name(commands::name::NameArgs),

    /// Show effect slots and their active effects
    Fx(commands::fx::FxArgs),

    /// Attribute-level differences between two records
    Diff(commands::diff::DiffArgs),

    /// Copy every settable field from one record to another
    Copy(commands::bulk::CopyArgs),

    /// Exchange every settable field between two records
    Swap(commands::bulk::SwapArgs),

    /// Return every settable field to its default
    Clear(commands::bulk::ClearArgs),

    /// Record new audio length on a track
    LinkAudio(commands::audio::LinkAudioArgs),

    /// Export and apply templates
    Template(commands::template::TemplateArgs),

    /// Set one field across many records
    BulkSet(commands::bulk::BulkSetArgs),

    /// List the loaded schema
    Schema(commands::schema::SchemaArgs),

    /// Show or change settings
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
    tracing_log::LogTracer::init().ok();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = || Context::load(cli.config.as_deref(), cli.schema_dir.as_deref());

    match cli.command {
        Commands::Show(args) => commands::show::run(args, &ctx()?),
        Commands::Set(args) => commands::set::run(args, &ctx()?),
        Commands::Name(args) => commands::name::run(args, &ctx()?),
        Commands::Fx(args) => commands::fx::run(args, &ctx()?),
        Commands::Diff(args) => commands::diff::run(args, &ctx()?),
        Commands::Copy(args) => commands::bulk::run_copy(args, &ctx()?),
        Commands::Swap(args) => commands::bulk::run_swap(args, &ctx()?),
        Commands::Clear(args) => commands::bulk::run_clear(args, &ctx()?),
        Commands::LinkAudio(args) => commands::audio::run(args, &ctx()?),
        Commands::Template(args) => commands::template::run(args, &ctx()?),
        Commands::BulkSet(args) => commands::bulk::run_bulk_set(args, &ctx()?),
        Commands::Schema(args) => commands::schema::run(args, &ctx()?),
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()),
    }
}
