//! Auth command handlers: setup, connect, status, refresh, disconnect

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use dialoguer::Input;

use crate::api::auth::needs_refresh;
use crate::api::constants::PROACTIVE_REFRESH_MARGIN_MS;
use crate::api::HubSpotClient;
use crate::cli::AuthCommands;
use crate::config::Config;

pub async fn handle(command: AuthCommands, config: &Config) -> Result<()> {
    match command {
        AuthCommands::Setup => setup(config),
        AuthCommands::Connect => connect(config).await,
        AuthCommands::Status => status(config).await,
        AuthCommands::Refresh { force } => refresh(config, force).await,
        AuthCommands::Disconnect => disconnect(config).await,
    }
}

fn setup(config: &Config) -> Result<()> {
    let mut settings = config.settings.clone();

    settings.client_id = Input::new()
        .with_prompt("Client ID")
        .with_initial_text(settings.client_id)
        .interact_text()
        .context("Failed to read the client id")?;
    settings.client_secret =
        rpassword::prompt_password("Client secret: ").context("Failed to read the client secret")?;
    settings.redirect_uri = Input::new()
        .with_prompt("Redirect URI")
        .with_initial_text(settings.redirect_uri)
        .interact_text()
        .context("Failed to read the redirect URI")?;

    let path = settings.save()?;
    println!("Settings written to {}", path.display().to_string().bright_green());
    Ok(())
}

async fn connect(config: &Config) -> Result<()> {
    config.settings.require_credentials()?;
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;

    println!("Open this URL in a browser and authorize the app:");
    println!();
    println!("  {}", client.auth().authorize_url().cyan());
    println!();
    println!("After authorizing, the browser lands on the redirect URI with a");
    println!("'code' query parameter.");

    let code: String = Input::new()
        .with_prompt("Authorization code")
        .interact_text()
        .context("Failed to read the authorization code")?;

    let token = client.auth().exchange_code(code.trim()).await?;
    let portal_id = client.auth().fetch_portal_id(&token.access_token).await?;

    println!(
        "{} portal {}",
        "Connected to".bright_green().bold(),
        portal_id.to_string().bold()
    );
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let Some(token) = config.store.get_token().await? else {
        println!("{}", "Not connected".yellow());
        println!("Run `hublens-cli auth connect` to authorize.");
        return Ok(());
    };

    match config.store.get_portal_id().await? {
        Some(portal_id) => println!("Connected to portal {}", portal_id.to_string().bold()),
        None => println!("Connected (portal unknown)"),
    }

    let now = Utc::now().timestamp_millis();
    match token.expires_at {
        Some(at) => {
            let when = DateTime::<Utc>::from_timestamp_millis(at)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| at.to_string());
            if now >= at {
                println!("Access token {} at {}", "expired".red(), when);
            } else if needs_refresh(Some(at), now, PROACTIVE_REFRESH_MARGIN_MS) {
                println!(
                    "Access token {} (expires {})",
                    "expiring soon".yellow(),
                    when
                );
            } else {
                println!("Access token valid until {}", when.bright_green());
            }
        }
        None => println!("Access token has no recorded expiry"),
    }
    Ok(())
}

async fn refresh(config: &Config, force: bool) -> Result<()> {
    config.settings.require_credentials()?;
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;

    if force {
        client.auth().refresh().await?;
        println!("{}", "Access token refreshed".bright_green());
    } else if client.auth().refresh_if_expiring().await? {
        println!("{}", "Access token refreshed".bright_green());
    } else {
        println!("Access token is still fresh; use --force to refresh anyway");
    }
    Ok(())
}

async fn disconnect(config: &Config) -> Result<()> {
    let client = HubSpotClient::new(config.settings.clone(), config.store.clone())?;
    client.auth().disconnect().await?;
    println!("Disconnected; stored token cleared");
    Ok(())
}
