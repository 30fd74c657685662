//! Template export and apply.

use anyhow::Context as _;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use rcforge_config::{FieldOutcome, Template, find_template, list_templates, user_templates_dir};

use super::common::{Context, each_file, section_matches};

#[derive(Args)]
pub struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Capture a record's settable fields into a template file
    Export {
        /// Record to capture
        file: PathBuf,

        /// Template file to write
        out: PathBuf,

        /// Only these sections (label or schema name); repeatable
        #[arg(short, long = "section")]
        sections: Vec<String>,

        /// Template name (defaults to the output file stem)
        #[arg(long)]
        name: Option<String>,

        /// Description stored with the template
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Apply a template to one or more records
    Apply {
        /// Template name or path
        template: String,

        /// Records to edit
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Only entries of these sections; repeatable
        #[arg(short, long = "section")]
        sections: Vec<String>,

        /// Clamp out-of-range integers instead of rejecting them
        #[arg(long)]
        clamp: bool,

        /// Show the changes without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List templates in the user templates directory
    List,
}

pub fn run(args: TemplateArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.command {
        TemplateCommand::Export {
            file,
            out,
            sections,
            name,
            description,
        } => {
            let record = ctx.open(&file)?;
            let name = name.unwrap_or_else(|| {
                out.file_stem()
                    .map_or_else(|| "template".to_string(), |s| s.to_string_lossy().into_owned())
            });
            let filter: Vec<&str> = sections.iter().map(String::as_str).collect();
            let mut template = Template::capture(name, &record, &filter);
            template.description = description;
            template.save(&out)?;
            println!(
                "wrote {} ({} section(s), {} field(s))",
                out.display(),
                template.sections.len(),
                template.len()
            );
            Ok(())
        }
        TemplateCommand::Apply {
            template,
            files,
            sections,
            clamp,
            dry_run,
        } => {
            let path = find_template(&template)
                .with_context(|| format!("template '{template}' not found"))?;
            let mut template = Template::load(&path)?;
            template.sections.retain(|label, _| section_matches(label, &sections));
            let policy = ctx.policy(clamp);

            each_file(&files, |file| {
                let mut record = ctx.open(file)?;
                let report = template.apply(&mut record, policy);
                for (key, outcome) in &report.entries {
                    if let FieldOutcome::Failed(e) = outcome {
                        eprintln!("{}: {key}: {e}", file.display());
                    }
                }
                ctx.finish(&mut record, file, dry_run)?;
                let failed = report.failures().count();
                if failed > 0 {
                    anyhow::bail!("{failed} template entr(ies) could not be applied");
                }
                Ok(())
            })
        }
        TemplateCommand::List => {
            println!("Templates in {}:", user_templates_dir().display());
            let names = list_templates();
            if names.is_empty() {
                println!("  (none)");
            }
            for name in names {
                println!("  {name}");
            }
            Ok(())
        }
    }
}
