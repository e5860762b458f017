// Outbound replies - every message the bot sends to users goes through the
// error scrubber first, then gets split to fit Discord's length limit.

use std::fmt::Display;

use crate::core::blacklist::{ErrorScrubber, OutboundResult};
use crate::discord::{Context, Data, Error};

/// Discord rejects messages longer than this.
const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Scrub and send a text reply.
pub async fn send_reply(ctx: Context<'_>, text: String) -> Result<(), Error> {
    for chunk in prepare_reply(&ctx.data().scrubber, text) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// Run the scrubber over `text` and cut the result into sendable chunks.
fn prepare_reply(scrubber: &ErrorScrubber, text: String) -> Vec<String> {
    let mut outbound = OutboundResult::text(text);
    scrubber.scrub(&mut outbound);
    split_message(&outbound.plain_text(), DISCORD_MESSAGE_LIMIT)
}

fn argument_parse_text(error: &dyn Display, input: Option<&str>) -> String {
    match input {
        Some(input) => format!("Could not parse `{}`: {}", input, error),
        None => format!("Invalid arguments: {}", error),
    }
}

/// Split text into chunks of at most `limit` characters.
fn split_message(text: &str, limit: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<char>>()
        .chunks(limit)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Framework error hook. Command failures, argument errors and check errors
/// are reported back to the caller through the scrubber. The framework's
/// own fixed notices (cooldowns, missing permissions) use the poise builtins.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                "Command failed: {}",
                error
            );
            let text = format!("Request failed: {}", error);
            if let Err(e) = send_reply(ctx, text).await {
                tracing::error!("Failed to send error reply: {}", e);
            }
        }
        poise::FrameworkError::ArgumentParse {
            error, input, ctx, ..
        } => {
            tracing::debug!(
                command = %ctx.command().qualified_name,
                "Argument parse failed: {}",
                error
            );
            let text = argument_parse_text(&error, input.as_deref());
            if let Err(e) = send_reply(ctx, text).await {
                tracing::error!("Failed to send error reply: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            tracing::error!(
                command = %ctx.command().qualified_name,
                "Command check failed: {}",
                error
            );
            let text = format!("Request failed: {}", error);
            if let Err(e) = send_reply(ctx, text).await {
                tracing::error!("Failed to send error reply: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: None, ctx, ..
        } => {
            // Blacklisted caller; the command is dropped without a reply.
            tracing::debug!(
                user_id = ctx.author().id.get(),
                command = %ctx.command().qualified_name,
                "Command suppressed by blacklist"
            );
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}
