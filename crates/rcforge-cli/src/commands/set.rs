//! Setting a single field.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;

use rcforge_model::AttrPath;

use super::common::{Context, print_dry_run};

#[derive(Args)]
pub struct SetArgs {
    /// Record file
    file: PathBuf,

    /// Field path, e.g. `TRACK1.pan`, `ifx.AA_DELAY.time`, `SETUP.#3`
    path: String,

    /// New value (`ON`/`OFF`, a number, or a choice label)
    value: String,

    /// Clamp out-of-range integers instead of rejecting them
    #[arg(long)]
    clamp: bool,

    /// Validate and show the change without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Write to this file instead of overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: SetArgs, ctx: &Context) -> anyhow::Result<()> {
    let path: AttrPath = args.path.parse()?;
    let mut record = ctx.open(&args.file)?;
    let policy = ctx.policy(args.clamp);
    let target = args.output.unwrap_or(args.file);

    if args.dry_run {
        let entries =
            record.dry_run(|r| r.set_text_with_policy(&path, &args.value, policy).map(|_| ()))?;
        print_dry_run(&target, &entries);
        return Ok(());
    }

    record
        .set_text_with_policy(&path, &args.value, policy)
        .with_context(|| format!("setting {path}"))?;
    ctx.finish(&mut record, &target, false)
}
