//! Effect slot overview.

use clap::Args;
use std::path::PathBuf;

use rcforge_model::{FxSlot, Record};
use rcforge_registry::SlotCoord;

use super::common::Context;

#[derive(Args)]
pub struct FxArgs {
    /// Memory file
    file: PathBuf,

    /// Only this group (`ifx`, `tfx`)
    #[arg(short, long)]
    group: Option<String>,

    /// Only this slot (`AA`..`DD`), with its active parameters
    #[arg(short, long)]
    slot: Option<String>,

    /// Switch the slot on or off (requires --group and --slot)
    #[arg(long, value_parser = ["on", "off"])]
    switch: Option<String>,

    /// Select the slot's effect type by name (requires --group and --slot)
    #[arg(long = "type", value_name = "EFFECT")]
    effect: Option<String>,

    /// Show the change without writing
    #[arg(short = 'n', long)]
    dry_run: bool,
}

pub fn run(args: FxArgs, ctx: &Context) -> anyhow::Result<()> {
    let coord = args.slot.as_deref().map(parse_slot).transpose()?;
    let mut record = ctx.open(&args.file)?;

    if args.switch.is_some() || args.effect.is_some() {
        let (Some(group), Some(coord)) = (args.group.as_deref(), coord) else {
            anyhow::bail!("--switch and --type need both --group and --slot");
        };
        if let Some(effect) = &args.effect {
            record.set_fx_type(group, coord, effect)?;
        }
        if let Some(switch) = &args.switch {
            record.set_fx_enabled(group, coord, switch == "on")?;
        }
        return ctx.finish(&mut record, &args.file, args.dry_run);
    }

    let groups: Vec<String> = match &args.group {
        Some(g) => vec![g.clone()],
        None => record.fx_groups().into_iter().map(str::to_string).collect(),
    };
    if groups.is_empty() {
        println!("{}: no effect groups", args.file.display());
    }
    for group in &groups {
        print_group(&record, group, coord);
    }
    Ok(())
}

fn parse_slot(text: &str) -> anyhow::Result<SlotCoord> {
    let upper = text.to_ascii_uppercase();
    SlotCoord::parse_prefix(&upper)
        .filter(|_| upper.len() == 2)
        .ok_or_else(|| anyhow::anyhow!("invalid slot '{text}' (expected AA..DD)"))
}

fn print_group(record: &Record, group: &str, only: Option<SlotCoord>) {
    let bank = record.current_bank(group).map_or_else(|| "?".to_string(), |b| b.to_string());
    println!("{group} (bank {bank})");
    for slot in record.fx_slots(group) {
        if only.is_some_and(|c| c != slot.coord) {
            continue;
        }
        println!("  {}", slot_line(&slot));
        if only.is_some()
            && let Some(block) = slot.active
        {
            for field in &block.fields {
                println!("      {:<20} {}", field.key.to_string(), field.describe());
            }
        }
    }
}

fn slot_line(slot: &FxSlot<'_>) -> String {
    let switch = match slot.enabled {
        Some(true) => "ON ",
        Some(false) => "OFF",
        None => "?  ",
    };
    let effect = match (slot.effect, slot.type_index) {
        (Some(name), _) => name.to_string(),
        (None, Some(i)) => format!("#{i} (undeclared)"),
        (None, None) => "?".to_string(),
    };
    let block = slot.active.map_or("no stored block", |s| s.name());
    format!("{} {switch} {effect:<14} [{block}]  {} stored", slot.coord, slot.blocks.len())
}
