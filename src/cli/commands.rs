use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Explore the unified ticketing API from the terminal",
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// API base URL (default: the public ticketing v1 endpoint)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API key; prompted for when missing
    #[arg(long, global = true, env = "MERGE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Linked-account token; prompted for when missing
    #[arg(long, global = true, env = "MERGE_ACCOUNT_TOKEN", hide_env_values = true)]
    pub account_token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse categories and resources and send requests interactively
    Explore,
    /// Tabbed dashboard over the common models
    Tools,
    /// Send a single request and print the result
    Call {
        /// Resource path, e.g. /tickets or /tickets/{id} already filled in
        #[arg(short, long)]
        path: String,
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Category the path belongs to
        #[arg(short, long, default_value = "Ticketing")]
        category: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,
        /// YAML or JSON file with the POST field values
        #[arg(short, long)]
        body: Option<PathBuf>,
        /// Print the presentation model as JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Show or change local settings
    Config {
        /// Default API base URL
        #[arg(long)]
        set_base_url: Option<String>,
        /// Category preselected in the explorer
        #[arg(long)]
        set_default_category: Option<String>,
        /// Request timeout in seconds (0 clears it)
        #[arg(long)]
        set_timeout: Option<u64>,
        /// Open the JSON inspector after each call
        #[arg(long)]
        set_inspector: Option<bool>,
    },
}
