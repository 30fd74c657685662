//! Settings inspection and editing.

use clap::{Args, ValueEnum};
use std::path::{Path, PathBuf};

use rcforge_config::{Settings, settings_path, user_templates_dir};
use rcforge_registry::OutOfRangePolicy;

#[derive(Args)]
pub struct ConfigArgs {
    /// Print the settings (the default when nothing is changed)
    #[arg(long)]
    show: bool,

    /// Load schema definitions from this directory
    #[arg(long, value_name = "DIR", conflicts_with = "clear_schema_dir")]
    set_schema_dir: Option<PathBuf>,

    /// Go back to the built-in schema
    #[arg(long)]
    clear_schema_dir: bool,

    /// How out-of-range integers are handled
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Check that records re-render identically before writing
    #[arg(long, value_name = "BOOL")]
    verify_fidelity: Option<bool>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Refuse the value
    Reject,
    /// Move the value to the nearest bound
    Clamp,
}

impl From<PolicyArg> for OutOfRangePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Reject => OutOfRangePolicy::Reject,
            PolicyArg::Clamp => OutOfRangePolicy::Clamp,
        }
    }
}

pub fn run(args: ConfigArgs, config: Option<&Path>) -> anyhow::Result<()> {
    let path = config.map_or_else(settings_path, Path::to_path_buf);
    let mut settings = Settings::load(&path)?;

    let mut changed = false;
    if let Some(dir) = args.set_schema_dir {
        settings.schema_dir = Some(dir);
        changed = true;
    }
    if args.clear_schema_dir {
        settings.schema_dir = None;
        changed = true;
    }
    if let Some(policy) = args.policy {
        settings.out_of_range = policy.into();
        changed = true;
    }
    if let Some(verify) = args.verify_fidelity {
        settings.verify_fidelity = verify;
        changed = true;
    }

    if changed {
        settings.save(&path)?;
        println!("updated {}", path.display());
    }
    if args.show || !changed {
        println!("Settings file: {}", path.display());
        println!("Templates:     {}", user_templates_dir().display());
        println!();
        print!("{}", settings.to_toml()?);
    }
    Ok(())
}
