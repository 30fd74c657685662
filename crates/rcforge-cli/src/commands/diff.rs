//! Structural diff of two records.

use clap::Args;
use std::path::PathBuf;

use super::common::{Context, section_matches};

#[derive(Args)]
pub struct DiffArgs {
    /// Left record
    a: PathBuf,

    /// Right record
    b: PathBuf,

    /// Only these sections; repeatable
    #[arg(short, long = "section")]
    sections: Vec<String>,
}

pub fn run(args: DiffArgs, ctx: &Context) -> anyhow::Result<()> {
    let a = ctx.open(&args.a)?;
    let b = ctx.open(&args.b)?;
    let entries: Vec<_> = a
        .diff(&b)
        .into_iter()
        .filter(|e| section_matches(&e.path.section_label(), &args.sections))
        .collect();
    for entry in &entries {
        println!("{entry}");
    }
    println!("{} difference(s)", entries.len());
    Ok(())
}
