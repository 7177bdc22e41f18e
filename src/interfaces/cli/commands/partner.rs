//! Add partner command

use std::str::FromStr;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::backend::NewPartner;
use crate::storage::{PartnerStatus, SeaOrmStorage};

pub async fn add_partner(
    storage: &SeaOrmStorage,
    name: String,
    cookie_days: Option<i32>,
    status: String,
) -> Result<(), CliError> {
    let status = PartnerStatus::from_str(&status).map_err(|_| {
        CliError::ParseError(format!(
            "Unknown partner status '{}' (expected active, pending, suspended or inactive)",
            status
        ))
    })?;

    let partner = storage
        .create_partner(NewPartner {
            name,
            status,
            cookie_duration: cookie_days,
        })
        .await?;

    let window = match partner.cookie_duration {
        Some(days) if days > 0 => format!("{} days", days),
        _ => "default".to_string(),
    };
    println!(
        "{} Added partner #{}: {} ({}, attribution window: {})",
        "✓".bold().green(),
        partner.id.to_string().magenta(),
        partner.name.cyan(),
        partner.status.to_string().yellow(),
        window
    );

    Ok(())
}
