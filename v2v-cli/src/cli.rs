//! Command-line argument parsing.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use v2v_builder::Ref;
use v2v_common::LogFormat;

/// v2v - Translate source VMs into destination volume, machine and task specs
#[derive(Parser, Debug)]
#[command(name = "v2v")]
#[command(about = "v2v - Translate source VMs into destination volume, machine and task specs")]
#[command(version)]
pub struct Args {
    /// Path to the plan configuration file
    #[arg(short, long, env = "V2V_CONFIG")]
    pub config: Option<String>,

    /// Path to an inventory snapshot (YAML, or JSON with a .json extension)
    #[arg(short, long, env = "V2V_INVENTORY")]
    pub inventory: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Plan namespace, also used to scope provisioner records
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// What to build.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Data-volume specs for every disk on a mapped storage domain
    Volumes(VmArgs),
    /// Machine spec, with data volumes named the way `plan` names them
    Machine(VmArgs),
    /// Per-disk progress tasks
    Tasks(VmArgs),
    /// Template selection labels
    Labels(VmArgs),
    /// Everything above in one document
    Plan(VmArgs),
    /// Importer secret and CA config map data from a provider secret file
    Credentials {
        /// YAML map of provider secret keys (user, password, cacert)
        #[arg(long)]
        provider_secret: String,
    },
}

/// Selects the source VM.
#[derive(ClapArgs, Debug, Clone)]
pub struct VmArgs {
    /// VM id (or name with --by-name)
    pub vm: String,

    /// Treat VM as a name instead of an id
    #[arg(long)]
    pub by_name: bool,
}

impl VmArgs {
    pub fn reference(&self) -> Ref {
        if self.by_name {
            Ref::with_name(&self.vm)
        } else {
            Ref::with_id(&self.vm)
        }
    }
}

/// Rendering of the produced documents.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}
