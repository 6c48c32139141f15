//! Command-line interface definitions

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::export::ExportFormat;

#[derive(Parser)]
#[command(
    name = "hublens-cli",
    version,
    about = "Query, inspect, and bookmark HubSpot CRM records from the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the OAuth connection to a HubSpot portal
    #[command(subcommand)]
    Auth(AuthCommands),
    /// Execute a query against a CRM object type
    Query(QueryArgs),
    /// Manage saved and recent queries
    #[command(subcommand)]
    Queries(QueriesCommands),
    /// Manage quick-link bookmarks
    #[command(subcommand)]
    Links(LinksCommands),
    /// List the properties available on an object type
    Properties(PropertiesArgs),
    /// Inspect a single record by id
    Record(RecordArgs),
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Store app credentials (client id, secret, redirect URI)
    Setup,
    /// Authorize against a portal and store the token
    Connect,
    /// Show the connection state
    Status,
    /// Refresh the access token
    Refresh {
        /// Refresh even if the token is not close to expiry
        #[arg(long)]
        force: bool,
    },
    /// Forget the stored token
    Disconnect,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Object type to query (contacts, companies, deals, ... or a custom
    /// object API name)
    pub object_type: String,

    /// Properties to fetch, in display order
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub properties: Vec<String>,

    /// Filter in PROP:OP[:VALUE] form (e.g. email:contains:@acme.com,
    /// phone:is_known); repeat to AND several filters
    #[arg(short, long = "filter", value_name = "PROP:OP[:VALUE]")]
    pub filters: Vec<String>,

    /// Maximum records to fetch (default: everything the API will return)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Also write the results to a file
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Export target: a file path or a directory for the timestamped default
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also save this query under a name
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Skip the bulk-export confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum QueriesCommands {
    /// List saved and recent queries
    List,
    /// Save a query definition under a name
    Save {
        name: String,
        object_type: String,
        #[arg(short, long, value_delimiter = ',', required = true)]
        properties: Vec<String>,
        #[arg(short, long = "filter", value_name = "PROP:OP[:VALUE]")]
        filters: Vec<String>,
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Execute a cached query by id (or saved-query name)
    Run {
        query: String,
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete a saved query by id
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum LinksCommands {
    /// List quick links
    List,
    /// Add a quick link
    Add {
        name: String,
        url: String,
        #[arg(long, default_value = "🔗")]
        icon: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        color: String,
    },
    /// Remove a quick link by id
    Remove { id: String },
    /// Move a quick link from one slot to another (0-based)
    Move { from: usize, to: usize },
}

#[derive(Args)]
pub struct PropertiesArgs {
    /// Object type to list properties for
    pub object_type: String,
}

#[derive(Args)]
pub struct RecordArgs {
    /// Object type the record belongs to
    pub object_type: String,
    /// Record id
    pub id: String,
    /// Properties to fetch
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub properties: Vec<String>,
}
