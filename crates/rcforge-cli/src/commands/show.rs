//! Record inspection.

use clap::Args;
use serde_json::{Map, Value as Json, json};
use std::path::PathBuf;

use rcforge_model::{Field, Record, RecordKind, writer};

use super::common::{Context, label, section_matches};

#[derive(Args)]
pub struct ShowArgs {
    /// Record file
    file: PathBuf,

    /// Only these sections (`TRACK1`, `ifx.AA`); repeatable
    #[arg(short, long = "section")]
    sections: Vec<String>,

    /// Also show the stored text of each field
    #[arg(long)]
    raw: bool,

    /// List what the schema does not describe
    #[arg(long)]
    gaps: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

pub fn run(args: ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let record = ctx.open(&args.file)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&record, &args.sections))?);
        return Ok(());
    }

    let kind = match record.kind() {
        RecordKind::Memory => "memory",
        RecordKind::System => "system",
    };
    let count = writer::counter(&record).map(|c| c.to_string()).unwrap_or_else(|| "-".into());
    match record.name() {
        Some(name) => println!("{} ({kind}, \"{name}\", count {count})", args.file.display()),
        None => println!("{} ({kind}, count {count})", args.file.display()),
    }

    for (group, section) in record.sections() {
        let label = label(group, section.name());
        if !section_matches(&label, &args.sections) {
            continue;
        }
        println!();
        println!("[{label}] {}", section.schema.as_deref().unwrap_or("(unmapped)"));
        for field in &section.fields {
            println!("  {}", field_line(field, args.raw));
        }
    }

    if args.gaps {
        let gaps = record.coverage_gaps();
        println!();
        println!("Coverage gaps ({}):", gaps.len());
        for gap in gaps {
            println!("  {gap}");
        }
    }
    Ok(())
}

/// `0..100`, with an open side left blank: `0..`, `..-1`.
fn range_text(min: i64, max: i64) -> String {
    let lo = if min == i64::MIN { String::new() } else { min.to_string() };
    let hi = if max == i64::MAX { String::new() } else { max.to_string() };
    format!("{lo}..{hi}")
}

fn field_line(field: &Field, raw: bool) -> String {
    let mut line = format!("{:<22} {}", field.key.to_string(), field.describe());
    if let Some(schema) = &field.schema {
        if let Some((min, max)) = schema.bounds() {
            line.push_str(&format!("  [{}]", range_text(min, max)));
        }
        if let Some(unit) = &schema.unit {
            line.push_str(&format!(" {unit}"));
        }
        if schema.read_only {
            line.push_str("  (read-only)");
        }
    } else {
        line.push_str("  (unmapped)");
    }
    if raw {
        line.push_str(&format!("  <- {}", field.raw.join(",")));
    }
    line
}

fn to_json(record: &Record, filters: &[String]) -> Json {
    let mut sections = Map::new();
    for (group, section) in record.sections() {
        let label = label(group, section.name());
        if !section_matches(&label, filters) {
            continue;
        }
        let fields: Map<String, Json> = section
            .fields
            .iter()
            .map(|f| (f.key.to_string(), Json::String(f.describe())))
            .collect();
        sections.insert(label, Json::Object(fields));
    }
    json!({
        "name": record.name(),
        "count": writer::counter(record).map(|c| c.value()),
        "sections": sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_text_open_bounds() {
        assert_eq!(range_text(0, 100), "0..100");
        assert_eq!(range_text(0, i64::MAX), "0..");
        assert_eq!(range_text(i64::MIN, -1), "..-1");
    }
}
