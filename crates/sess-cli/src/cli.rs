use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sess",
    about = "Content-addressed session store",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Journal file backing the store
    #[arg(long, global = true)]
    pub journal: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Store a session and print its id
    Create(CreateArgs),
    /// Show one session
    Get(IdArgs),
    /// List every session in a scope
    List(ScopeArgs),
    /// Find sessions whose field equals a string value
    Query(QueryArgs),
    /// Find sessions matching a JSON filter document
    Fetch(FetchArgs),
    /// Replace the data of an existing session
    Update(UpdateArgs),
    /// Delete a session
    Delete(IdArgs),
    /// Rewrite the journal to hold only live sessions
    Compact,
    /// List the accepted session types
    Types,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address; overrides the config file
    #[arg(long)]
    pub bind: Option<String>,
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct ScopeArgs {
    pub source: String,
    #[arg(value_name = "TYPE")]
    pub kind: String,
}

#[derive(Args)]
pub struct IdArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    pub id: String,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    /// Session data as a JSON object; read from stdin when omitted
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    pub id: String,
    /// Session data as a JSON object; read from stdin when omitted
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    pub field: String,
    pub value: String,
}

#[derive(Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
    pub filter: String,
}
