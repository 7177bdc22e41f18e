//! CLI interface module
//!
//! 管理命令直接连接数据库执行，不依赖正在运行的服务。

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands, LinkCommands, PartnerCommands};
use crate::config::StaticConfig;
use crate::errors::AffilinkError;
use crate::storage::{SeaOrmStorage, StorageFactory};
use commands::{add_partner, block_ip, config_generate, create_link};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<AffilinkError> for CliError {
    fn from(err: AffilinkError) -> Self {
        match &err {
            AffilinkError::Validation(_) | AffilinkError::DateParse(_) => {
                CliError::ParseError(err.format_simple())
            }
            AffilinkError::NotFound(_) => CliError::CommandError(err.format_simple()),
            _ => CliError::StorageError(err.format_simple()),
        }
    }
}

async fn open_storage(config: &StaticConfig) -> Result<std::sync::Arc<SeaOrmStorage>, CliError> {
    StorageFactory::create(&config.database)
        .await
        .map_err(|e| CliError::StorageError(e.format_simple()))
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need DB connection
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let storage = open_storage(config).await?;

    match cmd {
        Commands::Partner {
            action:
                PartnerCommands::Add {
                    name,
                    cookie_days,
                    status,
                },
        } => add_partner(&storage, name, cookie_days, status).await,

        Commands::Link {
            action:
                LinkCommands::Create {
                    partner,
                    url,
                    tracking_url,
                    expire,
                    product,
                    campaign,
                    code,
                },
        } => {
            let args = commands::CreateLinkArgs {
                partner_id: partner,
                url,
                tracking_url,
                expire,
                product_id: product,
                campaign_id: campaign,
                code,
            };
            create_link(&storage, args).await
        }

        Commands::BlockIp { ip_range, reason } => block_ip(&storage, ip_range, reason).await,

        Commands::Serve => unreachable!("serve handled in main"),

        Commands::Config { .. } => unreachable!("handled above"),
    }
}
