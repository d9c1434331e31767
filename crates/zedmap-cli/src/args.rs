use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use zedmap_core::config::{ResolutionMode, TuplesetResolution};

#[derive(Parser, Debug, Clone)]
#[command(name = "zedmap", version, about = "Relation maps for ReBAC schemas")]
pub struct Cli {
    /// Enable informational logging on stderr (honours RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate the relation map of a schema file.
    Genmap(GenmapArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenmapArgs {
    /// Schema file.
    pub schema: PathBuf,

    /// Output format: json, yaml or yml. Defaults to the output file
    /// extension, then json.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output path, `-` for stdout.
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Do not print schema warnings.
    #[arg(short, long)]
    pub quiet: bool,

    /// How references to other permissions are expanded.
    #[arg(long, value_enum, default_value_t = Resolution::SinglePass)]
    pub resolution: Resolution,

    /// How the entity behind `rel->perm` is chosen.
    #[arg(long, value_enum, default_value_t = Tupleset::RelationName)]
    pub tupleset: Tupleset,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    SinglePass,
    Closure,
}

impl From<Resolution> for ResolutionMode {
    fn from(r: Resolution) -> Self {
        match r {
            Resolution::SinglePass => Self::SinglePass,
            Resolution::Closure => Self::Closure,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tupleset {
    RelationName,
    AllowedTypes,
}

impl From<Tupleset> for TuplesetResolution {
    fn from(t: Tupleset) -> Self {
        match t {
            Tupleset::RelationName => Self::RelationName,
            Tupleset::AllowedTypes => Self::AllowedTypes,
        }
    }
}
