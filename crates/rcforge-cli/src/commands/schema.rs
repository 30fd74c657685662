//! Schema listing.

use clap::Args;

use rcforge_registry::{FieldKind, FieldLayout, SectionIdentity};

use super::common::Context;

#[derive(Args)]
pub struct SchemaArgs {
    /// Show the fields of this section schema or effect type
    name: Option<String>,
}

pub fn run(args: SchemaArgs, ctx: &Context) -> anyhow::Result<()> {
    let registry = &ctx.registry;
    let Some(name) = args.name else {
        println!("Sections ({}):", registry.len());
        for s in registry.sections() {
            println!(
                "  {:<12} {:<22} [{}]  {} field(s)",
                s.name,
                identity(&s.identity),
                s.groups.join(","),
                s.layout.len()
            );
        }
        println!();
        println!("Effect types:");
        for e in registry.effects() {
            println!("  {:<14} {} field(s)", e.name, e.layout.len());
        }
        for group in registry.effect_groups() {
            if let Some(table) = registry.effect_table(group) {
                println!();
                println!("Effect table {group} ({} type(s)):", table.len());
                for (index, effect) in table.iter() {
                    println!("  {index:>3}  {effect}");
                }
            }
        }
        return Ok(());
    };

    if let Some(section) = registry.section_by_name(&name) {
        println!("{} ({})", section.name, identity(&section.identity));
        if let Some(description) = &section.description {
            println!("{description}");
        }
        print_layout(&section.layout);
    } else if let Some(effect) = registry.effect_type_schema(&name) {
        println!("{} (effect type)", effect.name);
        print_layout(&effect.layout);
    } else {
        anyhow::bail!("no section schema or effect type named '{name}'");
    }
    Ok(())
}

fn identity(identity: &SectionIdentity) -> String {
    match identity {
        SectionIdentity::Fixed(name) => name.clone(),
        SectionIdentity::Numbered { prefix, first, last } => {
            format!("{prefix}{first}..{prefix}{last}")
        }
        SectionIdentity::Prefixed(prefix) => format!("{prefix}*"),
        SectionIdentity::SlotHeader => "AA..DD".to_string(),
    }
}

fn print_layout(layout: &FieldLayout) {
    for (i, field) in layout.fields().iter().enumerate() {
        let ordinal = layout.start_of(i).unwrap_or(i);
        let kind = match &field.kind {
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Int { min: Some(min), max: Some(max) } => format!("int {min}..{max}"),
            FieldKind::Int { min: Some(min), max: None } => format!("int >= {min}"),
            FieldKind::Int { .. } => "int".to_string(),
            FieldKind::Enum { choices } => format!("enum {}", choices.join("|")),
            FieldKind::Chars { len } => format!("chars x{len}"),
        };
        let flag = if field.read_only { "  read-only" } else { "" };
        println!(
            "  {ordinal:>3}  {:<22} {kind:<24} default {}{flag}",
            field.display_name(),
            field.describe(&field.default)
        );
    }
}
