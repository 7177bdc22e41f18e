//! Block IP command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;

pub async fn block_ip(
    storage: &SeaOrmStorage,
    ip_range: String,
    reason: Option<String>,
) -> Result<(), CliError> {
    storage.block_ip(&ip_range, reason.clone()).await?;

    match reason {
        Some(reason) => println!(
            "{} Blocked {} ({})",
            "✓".bold().green(),
            ip_range.cyan(),
            reason.dimmed()
        ),
        None => println!("{} Blocked {}", "✓".bold().green(), ip_range.cyan()),
    }
    println!(
        "  {}",
        "Running servers pick this up once their block-list cache expires".dimmed()
    );

    Ok(())
}
