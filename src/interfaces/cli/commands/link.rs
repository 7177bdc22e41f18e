//! Create link command

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::storage::SeaOrmStorage;
use crate::storage::backend::NewLink;
use crate::utils::expiry::parse_expiry;

pub struct CreateLinkArgs {
    pub partner_id: i64,
    pub url: String,
    pub tracking_url: Option<String>,
    pub expire: Option<String>,
    pub product_id: Option<i64>,
    pub campaign_id: Option<i64>,
    pub code: Option<String>,
}

pub async fn create_link(storage: &SeaOrmStorage, args: CreateLinkArgs) -> Result<(), CliError> {
    let expires_at = args.expire.as_deref().map(parse_expiry).transpose()?;
    let generated = args.code.is_none();

    let link = storage
        .create_link(NewLink {
            partner_id: args.partner_id,
            original_url: args.url,
            tracking_url: args.tracking_url,
            expires_at,
            product_id: args.product_id,
            campaign_id: args.campaign_id,
            short_code: args.code,
        })
        .await?;

    if generated {
        println!(
            "{} Generated random code: {}",
            "ℹ".bold().blue(),
            link.short_code.magenta()
        );
    }

    let destination = link.destination().to_string();
    match link.expires_at {
        Some(expires_at) => println!(
            "{} Created link: /go/{} -> {} (expires: {})",
            "✓".bold().green(),
            link.short_code.cyan(),
            destination.blue().underline(),
            expires_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
                .yellow()
        ),
        None => println!(
            "{} Created link: /go/{} -> {}",
            "✓".bold().green(),
            link.short_code.cyan(),
            destination.blue().underline()
        ),
    }

    Ok(())
}
