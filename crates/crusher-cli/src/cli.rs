use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "crusher",
    about = "Store values of any size in a size-capped backend",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Folder holding the stored records
    #[arg(long, global = true, default_value = ".crusher")]
    pub root: PathBuf,

    /// TOML file with engine settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a value under a key
    Put(PutArgs),
    /// Print the value stored under a key
    Get(GetArgs),
    /// Remove a key and all of its fragments
    Rm(RmArgs),
    /// Show how a key is laid out in the store
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct PutArgs {
    pub key: String,
    /// Text value; omit when using --file or --json
    pub value: Option<String>,
    /// Store the contents of a file as a blob
    #[arg(long, conflicts_with_all = ["value", "json"])]
    pub file: Option<PathBuf>,
    /// Store a JSON document
    #[arg(long, conflicts_with = "value")]
    pub json: Option<String>,
    /// Content type recorded with a --file blob
    #[arg(long, requires = "file")]
    pub content_type: Option<String>,
    /// Expire the value after this many seconds
    #[arg(long)]
    pub expire: Option<u64>,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    /// Write a blob value to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct RmArgs {
    pub key: String,
}

#[derive(Args)]
pub struct InspectArgs {
    pub key: String,
}
