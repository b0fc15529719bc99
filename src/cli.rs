// ABOUTME: Command line definition for schema-atlas
// ABOUTME: Subcommands for profile management, connection testing, discovery and lookup

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CONFIG_PATH_ENV;

#[derive(Debug, Parser)]
#[command(name = "schema-atlas", version, about = "Discover and navigate PostgreSQL schemata")]
pub struct Cli {
    /// Path to the config file
    #[arg(long, env = CONFIG_PATH_ENV, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage connection profiles
    Profiles {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Connect with a profile and report the server version
    TestConnection {
        /// Profile to use (defaults to the configured default profile)
        #[arg(long)]
        profile: Option<String>,
    },
    /// Register profiles as engines, discover them and print the catalog tree
    Discover {
        /// Profiles to register (defaults to all)
        #[arg(long = "profile")]
        profiles: Vec<String>,
        #[arg(long)]
        include_views: bool,
    },
    /// Print the engine, schema or table at a dotted path
    Describe {
        /// `engine`, `engine.schema` or `engine.schema.table`
        path: String,
        #[arg(long = "profile")]
        profiles: Vec<String>,
        #[arg(long)]
        include_views: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    List,
    Add(NewProfile),
    Remove { name: String },
}

#[derive(Debug, Args)]
pub struct NewProfile {
    pub name: String,
    #[arg(long, default_value = "localhost")]
    pub host: String,
    #[arg(long, default_value_t = 5432)]
    pub port: u16,
    /// Defaults to the current OS user
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long, env = "PGPASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub database: Option<String>,
    /// Registry name; defaults to the database name
    #[arg(long)]
    pub engine_name: Option<String>,
    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}
