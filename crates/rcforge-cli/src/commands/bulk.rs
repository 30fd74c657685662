//! Record-level bulk operations: copy, swap, clear, and batch set.

use anyhow::Context as _;
use clap::Args;
use std::path::PathBuf;

use rcforge_model::AttrPath;

use super::common::{Context, each_file};

#[derive(Args)]
pub struct CopyArgs {
    /// Record to copy from
    source: PathBuf,

    /// Record to overwrite
    target: PathBuf,

    /// Show the changes without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct SwapArgs {
    /// First record
    a: PathBuf,

    /// Second record
    b: PathBuf,

    /// Show the changes without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Record to reset
    file: PathBuf,

    /// Show the changes without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct BulkSetArgs {
    /// Field path, e.g. `MASTER.level`
    path: String,

    /// New value
    value: String,

    /// Records to edit
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Clamp out-of-range integers instead of rejecting them
    #[arg(long)]
    clamp: bool,

    /// Show the changes without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

pub fn run_copy(args: CopyArgs, ctx: &Context) -> anyhow::Result<()> {
    let source = ctx.open(&args.source)?;
    let mut target = ctx.open(&args.target)?;
    target.copy_from(&source)?;
    ctx.finish(&mut target, &args.target, args.dry_run)
}

pub fn run_swap(args: SwapArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut a = ctx.open(&args.a)?;
    let mut b = ctx.open(&args.b)?;
    a.swap_with(&mut b)?;
    ctx.finish(&mut a, &args.a, args.dry_run)?;
    ctx.finish(&mut b, &args.b, args.dry_run)
}

pub fn run_clear(args: ClearArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut record = ctx.open(&args.file)?;
    record.reset_to_defaults()?;
    ctx.finish(&mut record, &args.file, args.dry_run)
}

pub fn run_bulk_set(args: BulkSetArgs, ctx: &Context) -> anyhow::Result<()> {
    let path: AttrPath = args.path.parse()?;
    let policy = ctx.policy(args.clamp);

    each_file(&args.files, |file| {
        let mut record = ctx.open(file)?;
        record
            .set_text_with_policy(&path, &args.value, policy)
            .with_context(|| format!("{}: setting {path}", file.display()))?;
        ctx.finish(&mut record, file, args.dry_run)
    })
}
