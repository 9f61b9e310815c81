use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stellar::client::{HttpShortenerClient, ShortenerApi};
use stellar::config::Config;
use stellar::controller::{display_short_url, Controller, SHORTEN_FAILED_MESSAGE};
use stellar::models::ShortenResponse;

#[derive(Parser)]
#[command(name = "stellar")]
#[command(about = "Shorten URLs and follow their click counts", long_about = None, version)]
struct Cli {
    /// Configuration file (defaults to ./stellar.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the API base URL, e.g. https://short.example/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a long URL
    Shorten {
        /// Absolute URL to shorten
        url: String,
        /// Custom alias for the short URL
        #[arg(long)]
        alias: Option<String>,
        /// Copy the short URL to the clipboard
        #[arg(long)]
        copy: bool,
        /// Keep polling the click count until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Show statistics for a short URL or identifier
    Stats {
        short: String,
        /// Keep polling the click count until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Check whether a custom alias is still free
    AliasAvailable { alias: String },
    /// Validate a custom alias against the service rules
    ValidateAlias { alias: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => {
            dotenvy::dotenv().ok();
            Config::load(Some(path))?
        }
        None => Config::from_env()?,
    };
    if let Some(api_url) = cli.api_url {
        config.api.base_url = api_url;
        config.validate()?;
    }
    info!(base_url = %config.api.base_url, "using shortener API");

    let client = HttpShortenerClient::new(&config.api).context("failed to create API client")?;
    let api: Arc<dyn ShortenerApi> = Arc::new(client);
    let poll_interval = Duration::from_secs(config.stats.poll_interval_secs);

    match cli.command {
        Commands::Shorten {
            url,
            alias,
            copy,
            watch,
        } => {
            if let Some(alias) = alias.as_deref() {
                check_alias(api.as_ref(), alias).await?;
            }

            let mut controller =
                Controller::new(Arc::clone(&api)).with_display_domain(config.display.domain.clone());

            let submitted = match alias.as_deref() {
                Some(alias) => controller.submit_with_alias(&url, alias),
                None => controller.submit(&url),
            };
            if submitted.is_ok() {
                controller.settle().await;
            }

            if let Some(message) = controller.state().error_message() {
                bail!("{message}");
            }
            let Some(short_url) = controller.display_short_url() else {
                bail!(SHORTEN_FAILED_MESSAGE);
            };

            println!("✓ {}", short_url);
            if let Some(response) = controller.state().last_response() {
                println!("  Original: {}", response.original_url);
                println!("  Created:  {}", response.created_at.to_rfc3339());
            }
            print_clicks(controller.state().click_count());

            if copy {
                copy_short_url(&controller);
            }
            if watch {
                watch_controller(&mut controller, poll_interval).await;
            }
        }
        Commands::Stats { short, watch } => {
            let response = api.get_stats(&short).await?;
            print_stats(&response, config.display.domain.as_deref());

            if watch {
                watch_stats(api.as_ref(), &short, response.click_count, poll_interval).await;
            }
        }
        Commands::AliasAvailable { alias } => {
            if api.check_alias_availability(&alias).await? {
                println!("✓ Alias '{}' is available", alias);
            } else {
                println!("⚠ Alias '{}' is already taken", alias);
            }
        }
        Commands::ValidateAlias { alias } => {
            let validation = api.validate_custom_alias(&alias).await?;
            if validation.valid {
                println!("✓ Alias '{}' is valid", alias);
            } else {
                println!(
                    "⚠ Alias '{}' is not valid: {}",
                    alias,
                    validation
                        .message
                        .unwrap_or_else(|| "no reason given".to_string())
                );
            }
        }
    }

    Ok(())
}

/// Refuse to submit under an alias the service would reject
async fn check_alias(api: &dyn ShortenerApi, alias: &str) -> Result<()> {
    let validation = api
        .validate_custom_alias(alias)
        .await
        .context("failed to validate alias")?;
    if !validation.valid {
        bail!(
            "Alias '{}' is not valid: {}",
            alias,
            validation
                .message
                .unwrap_or_else(|| "no reason given".to_string())
        );
    }

    let available = api
        .check_alias_availability(alias)
        .await
        .context("failed to check alias availability")?;
    if !available {
        bail!("Alias '{}' is already taken", alias);
    }

    Ok(())
}

fn print_clicks(click_count: Option<u64>) {
    match click_count {
        Some(count) => println!("  Clicks:   {}", count),
        None => println!("  Clicks:   unavailable"),
    }
}

fn print_stats(response: &ShortenResponse, display_domain: Option<&str>) {
    println!("{}", display_short_url(&response.short_url, display_domain));
    println!("  Original: {}", response.original_url);
    println!("  Created:  {}", response.created_at.to_rfc3339());
    print_clicks(Some(response.click_count));
}

#[cfg(feature = "clipboard")]
fn copy_short_url(controller: &Controller) {
    match stellar::clipboard::SystemClipboard::new() {
        Ok(mut clipboard) => {
            if controller.copy_to_clipboard(&mut clipboard) {
                println!("✓ Copied to clipboard");
            }
        }
        Err(err) => warn!(error = %err, "system clipboard unavailable"),
    }
}

#[cfg(not(feature = "clipboard"))]
fn copy_short_url(_controller: &Controller) {
    warn!("built without the clipboard feature, nothing copied");
}

async fn watch_controller(controller: &mut Controller, every: Duration) {
    println!("Watching clicks every {}s, Ctrl-C to stop", every.as_secs());

    let mut last = controller.state().click_count();
    let mut ticker = tokio::time::interval(every);
    // First tick fires immediately; stats were just loaded
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                controller.refresh_stats();
                controller.settle().await;

                let current = controller.state().click_count();
                if current != last {
                    print_clicks(current);
                    last = current;
                }
            }
        }
    }
}

async fn watch_stats(api: &dyn ShortenerApi, short: &str, mut last: u64, every: Duration) {
    println!("Watching clicks every {}s, Ctrl-C to stop", every.as_secs());

    let mut ticker = tokio::time::interval(every);
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                match api.get_stats(short).await {
                    Ok(response) if response.click_count != last => {
                        print_clicks(Some(response.click_count));
                        last = response.click_count;
                    }
                    Ok(_) => {}
                    Err(err) => warn!(error = %err, "failed to refresh stats"),
                }
            }
        }
    }
}
