// This is the entry point of the blacklist bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (file storage)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands and event handlers

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::blacklist::{BlacklistConfig, BlacklistKind, BlacklistService, ErrorScrubber};
use crate::discord::moderation::{interceptor, outbound};
use crate::discord::{Data, Error};
use crate::infra::blacklist::JsonBlacklistStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::sync::Arc;

const DEFAULT_DATA_DIR: &str = "data/plugin_data/blacklist";
const DEFAULT_PREFIX: &str = "/";

/// Event handler for non-command Discord events.
async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            let users = data.blacklist.count(BlacklistKind::User).await;
            let groups = data.blacklist.count(BlacklistKind::Group).await;
            tracing::info!(
                bot = %data_about_bot.user.name,
                users = users,
                groups = groups,
                "Blacklist filter enabled"
            );
        }
        _ => {}
    }

    Ok(())
}

/// Read the error signature list, one regex per line. Blank lines and
/// `#` comments are skipped.
fn read_pattern_file(path: &str) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read error pattern file at {}", path))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Extra admin ids from a comma-separated list; invalid entries are skipped.
fn parse_admin_ids(raw: &str) -> HashSet<serenity::UserId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter_map(|id| match id.parse::<u64>() {
            Ok(0) | Err(_) => {
                tracing::warn!("Ignoring invalid admin id: {:?}", id);
                None
            }
            Ok(id) => Some(serenity::UserId::new(id)),
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = std::env::var("DISCORD_TOKEN").context(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    )?;

    let mut config = BlacklistConfig::from_lookup(|key| std::env::var(key).ok());
    if let Ok(path) = std::env::var("ERROR_INTERCEPT_PATTERNS_FILE") {
        config.error_intercept_patterns = read_pattern_file(&path)?;
    }

    let data_dir =
        std::env::var("BLACKLIST_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let prefix = std::env::var("COMMAND_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());
    let owners = std::env::var("BLACKLIST_ADMIN_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let scrubber = Arc::new(
        ErrorScrubber::new(&config).context("Invalid error interception pattern")?,
    );

    let store = JsonBlacklistStore::new(&data_dir);
    let blacklist = Arc::new(BlacklistService::new(store, config).await);

    tracing::info!(
        data_dir = %data_dir,
        users = blacklist.count(BlacklistKind::User).await,
        groups = blacklist.count(BlacklistKind::Group).await,
        "Blacklist filter initialized"
    );

    // Create the data structure that will be shared across all commands
    let data = Data {
        blacklist: Arc::clone(&blacklist),
        scrubber: Arc::clone(&scrubber),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read prefix commands
        | serenity::GatewayIntents::GUILDS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::blacklist::blacklist()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            owners,
            // Blacklisted callers never reach a command
            command_check: Some(|ctx| Box::pin(interceptor::command_check(ctx))),
            on_error: |error| Box::pin(outbound::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;
    Ok(())
}
