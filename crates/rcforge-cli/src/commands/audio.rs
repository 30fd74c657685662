//! Track audio geometry.

use clap::Args;
use std::path::PathBuf;

use super::common::Context;

#[derive(Args)]
pub struct LinkAudioArgs {
    /// Memory file
    file: PathBuf,

    /// Track number, from 1
    track: usize,

    /// Length of the new audio in samples
    samples: u64,

    /// Show the change without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

pub fn run(args: LinkAudioArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut record = ctx.open(&args.file)?;
    record.link_track_audio(args.track, args.samples)?;
    ctx.finish(&mut record, &args.file, args.dry_run)
}
