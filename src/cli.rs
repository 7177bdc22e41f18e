//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Affilink - affiliate short-link redirector with click attribution
#[derive(Parser)]
#[command(name = "affilink")]
#[command(version)]
#[command(about = "Affiliate short-link redirector with click attribution", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP redirect server (default)
    Serve,

    /// Manage affiliate partners
    Partner {
        #[command(subcommand)]
        action: PartnerCommands,
    },

    /// Manage affiliate links
    Link {
        #[command(subcommand)]
        action: LinkCommands,
    },

    /// Add an IP address or CIDR range to the block list
    BlockIp {
        /// Single IP (203.0.113.7) or CIDR range (203.0.113.0/24)
        ip_range: String,

        /// Why the range is blocked
        #[arg(long)]
        reason: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PartnerCommands {
    /// Create a partner
    Add {
        name: String,

        /// Attribution window in days (default from tracking.default_attribution_days)
        #[arg(long)]
        cookie_days: Option<i32>,

        /// active, pending, suspended or inactive
        #[arg(long, default_value = "active")]
        status: String,
    },
}

#[derive(Subcommand)]
pub enum LinkCommands {
    /// Create a link with a random unguessable short code
    Create {
        /// Owning partner id
        #[arg(long)]
        partner: i64,

        /// Vendor product page
        url: String,

        /// Redirect here instead of the product page
        #[arg(long)]
        tracking_url: Option<String>,

        /// Expiration time (RFC3339 or relative like "30d", "12h")
        #[arg(long)]
        expire: Option<String>,

        #[arg(long)]
        product: Option<i64>,

        #[arg(long)]
        campaign: Option<i64>,

        /// Use this short code instead of a generated one
        #[arg(long)]
        code: Option<String>,
    },
}

/// Configuration management commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
