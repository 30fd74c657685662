//! Shared CLI helpers used across multiple commands.

use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcforge_config::{Settings, settings_path};
use rcforge_model::{DiffEntry, Record, writer};
use rcforge_registry::{OutOfRangePolicy, SchemaRegistry};

/// Settings and schema shared by every command of one invocation.
pub struct Context {
    /// Loaded settings.
    pub settings: Settings,
    /// Schema registry records are decoded with.
    pub registry: Arc<SchemaRegistry>,
}

impl Context {
    /// Load settings, then the schema from `--schema-dir`, the settings, or
    /// the built-in set, in that order.
    pub fn load(config: Option<&Path>, schema_dir: Option<&Path>) -> anyhow::Result<Self> {
        let config = config.map_or_else(settings_path, Path::to_path_buf);
        let settings = Settings::load(&config)?;
        let dir: Option<PathBuf> = schema_dir
            .map(Path::to_path_buf)
            .or_else(|| settings.schema_dir.clone());
        let registry = match dir {
            Some(dir) => Arc::new(
                SchemaRegistry::load_dir(&dir)
                    .with_context(|| format!("loading schema from {}", dir.display()))?,
            ),
            None => SchemaRegistry::builtin(),
        };
        Ok(Self { settings, registry })
    }

    /// Out-of-range policy, `--clamp` taking precedence over the settings.
    pub fn policy(&self, clamp: bool) -> OutOfRangePolicy {
        if clamp {
            OutOfRangePolicy::Clamp
        } else {
            self.settings.out_of_range
        }
    }

    /// Read and decode a record.
    pub fn open(&self, path: &Path) -> anyhow::Result<Record> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let record = Record::decode(&text, Arc::clone(&self.registry))
            .with_context(|| format!("decoding {}", path.display()))?;
        if self.settings.verify_fidelity {
            writer::verify(&record)
                .with_context(|| format!("{} does not re-render identically", path.display()))?;
        }
        Ok(record)
    }

    /// Print the pending changes of `record`, then save it to `target`
    /// unless `dry_run` is set.
    pub fn finish(&self, record: &mut Record, target: &Path, dry_run: bool) -> anyhow::Result<()> {
        let pending = record.pending_changes();
        if dry_run {
            print_dry_run(target, &pending);
            return Ok(());
        }
        if pending.is_empty() {
            println!("{}: no changes", target.display());
            return Ok(());
        }
        for entry in &pending {
            println!("  {entry}");
        }
        let text = record.save()?;
        std::fs::write(target, text).with_context(|| format!("writing {}", target.display()))?;
        let count = writer::counter(record).map(|c| c.to_string()).unwrap_or_default();
        println!("wrote {} ({} change(s), count {count})", target.display(), pending.len());
        Ok(())
    }
}

/// Run `edit` on every file independently.
///
/// A file that fails to open, edit, or write is logged and counted; the
/// remaining files are still processed. Fails at the end if any file did.
pub fn each_file<F>(files: &[PathBuf], mut edit: F) -> anyhow::Result<()>
where
    F: FnMut(&Path) -> anyhow::Result<()>,
{
    let mut failed = 0;
    for file in files {
        if let Err(e) = edit(file) {
            tracing::error!(file = %file.display(), "{e:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} record(s) failed", files.len());
    }
    Ok(())
}

/// Print what a dry run would change.
pub fn print_dry_run(target: &Path, entries: &[DiffEntry]) {
    println!("(dry-run) {}: {} change(s)", target.display(), entries.len());
    for entry in entries {
        println!("  {entry}");
    }
}

/// `TRACK1` for the primary group, `ifx.AA` otherwise.
pub fn label(group: Option<&str>, section: &str) -> String {
    match group {
        Some(group) => format!("{group}.{section}"),
        None => section.to_string(),
    }
}

/// Whether a section label passes a `-s` filter.
///
/// `TRACK1` matches `TRACK1` only; `ifx.AA` matches `ifx.AA` and every
/// block of that slot (`ifx.AA_DELAY`). Case is ignored.
pub fn section_matches(label: &str, filters: &[String]) -> bool {
    filters.is_empty()
        || filters.iter().any(|f| {
            let label = label.to_ascii_uppercase();
            let f = f.to_ascii_uppercase();
            label == f || label.strip_prefix(&f).is_some_and(|rest| rest.starts_with('_'))
        })
}
