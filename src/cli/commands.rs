use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pinnote", about = concat!("pinnote v", env!("CARGO_PKG_VERSION"), " - PIN-verified notes on records"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./pinnote.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Notes service base URL, overriding [api] base_url
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the notes modal for a record
    Open(OpenArgs),
    /// List a record's notes grouped by table source
    List(ListArgs),
    /// Add a note (PIN-verified)
    Add(AddArgs),
    /// Edit an existing note (PIN-verified)
    Edit(EditArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct OpenArgs {
    /// Record identifier
    pub id_input: String,
    /// Table the record belongs to, e.g. table_sales
    pub table_source: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Record identifier
    pub id_input: String,
    /// Only show notes from this table source
    #[arg(long = "table-source")]
    pub table_source: Option<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Record identifier
    pub id_input: String,
    /// Table the record belongs to
    pub table_source: String,
    /// Note title; `@Name` mentions are relayed
    #[arg(long)]
    pub title: String,
    /// Note content
    #[arg(long)]
    pub content: String,
    /// Your name, as listed in [people] creators
    #[arg(long = "by")]
    pub created_by: String,
    /// Your 4-digit PIN
    #[arg(long)]
    pub pin: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Record identifier
    pub id_input: String,
    /// Table the record belongs to
    pub table_source: String,
    /// Note to edit
    pub note_id: String,
    /// New title (default: keep)
    #[arg(long)]
    pub title: Option<String>,
    /// New content (default: keep)
    #[arg(long)]
    pub content: Option<String>,
    /// Your name (default: the note's creator, when on the roster)
    #[arg(long = "by")]
    pub created_by: Option<String>,
    /// Your 4-digit PIN
    #[arg(long)]
    pub pin: String,
}
