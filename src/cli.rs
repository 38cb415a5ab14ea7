use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use routekit::RouteType;
use std::time::Duration;

use crate::ui::parse_duration;

#[derive(Parser)]
#[command(name = "fnroutes")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Manage routes on a functions server", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Functions API base URL
    #[arg(long, global = true, env = "API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Manage routes
    #[command(subcommand)]
    Routes(RoutesCommand),

    /// Call a remote function
    Call(CallArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Routes Commands
// ============================================================================

#[derive(Subcommand)]
pub enum RoutesCommand {
    /// Call a route
    Call(CallArgs),

    /// List routes for an app
    #[command(visible_alias = "l")]
    List {
        /// App name
        app: String,
    },

    /// Create a route in an app
    #[command(visible_alias = "c")]
    Create {
        /// App name
        app: String,

        /// Route path (defaults to the func file path)
        path: Option<String>,

        /// Image name (defaults to the func file image)
        image: Option<String>,

        #[command(flatten)]
        fields: RouteFieldArgs,
    },

    /// Update a route in an app
    #[command(visible_alias = "u")]
    Update {
        /// App name
        app: String,

        /// Route path (defaults to the func file path)
        path: Option<String>,

        /// Image name (defaults to the func file image)
        image: Option<String>,

        /// Image name
        #[arg(short, long = "image", conflicts_with = "image")]
        image_flag: Option<String>,

        #[command(flatten)]
        fields: RouteFieldArgs,

        /// Remove a configuration key
        #[arg(long, value_name = "KEY")]
        unset_config: Vec<String>,

        /// Remove a response header
        #[arg(long, value_name = "NAME")]
        unset_header: Vec<String>,
    },

    /// Operate a route configuration set
    #[command(subcommand)]
    Config(RouteConfigCommand),

    /// Delete a route from an app
    #[command(visible_alias = "d")]
    Delete {
        /// App name
        app: String,

        /// Route path
        path: String,
    },

    /// Retrieve one or all route properties
    #[command(visible_alias = "i")]
    Inspect {
        /// App name
        app: String,

        /// Route path
        path: String,

        /// Property to show, e.g. `image` or `config.DB_URL`
        property: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RouteConfigCommand {
    /// Store a configuration key for this route
    #[command(visible_alias = "s")]
    Set {
        /// App name
        app: String,
        /// Route path
        path: String,
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },

    /// Remove a configuration key for this route
    #[command(visible_alias = "u")]
    Unset {
        /// App name
        app: String,
        /// Route path
        path: String,
        /// Configuration key
        key: String,
    },
}

/// Route attributes shared by create and update
#[derive(Args)]
pub struct RouteFieldArgs {
    /// Memory in MiB
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub memory: Option<u64>,

    /// Route type
    #[arg(short = 't', long = "type", value_enum)]
    pub route_type: Option<RouteTypeArg>,

    /// Route configuration (KEY=VALUE, repeatable)
    #[arg(short, long, value_name = "KEY=VALUE")]
    pub config: Vec<String>,

    /// Route response headers (NAME=V1;V2, repeatable)
    #[arg(long = "headers", visible_alias = "header", value_name = "NAME=VALUES")]
    pub headers: Vec<String>,

    /// Hot function IO format - json or http
    #[arg(short, long)]
    pub format: Option<String>,

    /// Maximum concurrency for hot functions
    #[arg(long, visible_alias = "mc", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_concurrency: Option<u32>,

    /// Route timeout (e.g. 30s, 1m30s)
    #[arg(long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RouteTypeArg {
    Sync,
    Async,
}

impl From<RouteTypeArg> for RouteType {
    fn from(arg: RouteTypeArg) -> Self {
        match arg {
            RouteTypeArg::Sync => RouteType::Sync,
            RouteTypeArg::Async => RouteType::Async,
        }
    }
}

// ============================================================================
// Call
// ============================================================================

#[derive(Args)]
pub struct CallArgs {
    /// App name
    pub app: String,

    /// Route path
    pub path: String,

    /// HTTP method (defaults to POST with stdin input, GET otherwise)
    #[arg(long)]
    pub method: Option<String>,

    /// Forward a local environment variable as a request header
    #[arg(short = 'e', long = "env", value_name = "NAME")]
    pub env: Vec<String>,
}
