//! Renaming a memory.

use clap::Args;
use std::path::PathBuf;

use super::common::Context;

#[derive(Args)]
pub struct NameArgs {
    /// Memory file
    file: PathBuf,

    /// New name, up to twelve printable characters
    name: String,

    /// Show the change without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write to this file instead of overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: NameArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut record = ctx.open(&args.file)?;
    let old = record.name().unwrap_or_default().to_string();
    record.set_name(&args.name)?;
    println!("name: \"{old}\" -> \"{}\"", record.name().unwrap_or_default());
    ctx.finish(&mut record, &args.output.unwrap_or(args.file), args.dry_run)
}
