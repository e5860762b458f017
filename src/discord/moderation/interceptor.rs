// Discord-specific interception - adapts Discord messages and command
// invocations to the core message view and stops blacklisted callers.

use crate::core::blacklist::{InboundMessage, InboundMessageView, ViewError};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Message view over a gateway message. A server is the "group";
/// direct messages have no guild and count as private.
pub struct DiscordMessageView<'a>(pub &'a serenity::Message);

impl InboundMessage for DiscordMessageView<'_> {
    fn sender_id(&self) -> Result<String, ViewError> {
        Ok(self.0.author.id.get().to_string())
    }

    fn group_id(&self) -> Result<Option<String>, ViewError> {
        Ok(self.0.guild_id.map(|id| id.get().to_string()))
    }

    fn is_private(&self) -> Result<bool, ViewError> {
        Ok(self.0.guild_id.is_none())
    }
}

/// Build the view for a slash command invocation, which has no message.
fn interaction_view(
    user_id: serenity::UserId,
    guild_id: Option<serenity::GuildId>,
) -> InboundMessageView {
    let sender_id = user_id.get().to_string();
    match guild_id {
        Some(guild_id) => InboundMessageView::group(sender_id, guild_id.get().to_string()),
        None => InboundMessageView::private(sender_id),
    }
}

/// Global command check: blacklisted callers cannot run any command.
///
/// This is the single interception point, so each blocked invocation is
/// checked (and logged) once.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let blacklist = &ctx.data().blacklist;

    let blocked = match ctx {
        poise::Context::Prefix(prefix) => {
            blacklist
                .is_blacklisted(&DiscordMessageView(prefix.msg))
                .await
        }
        poise::Context::Application(_) => {
            blacklist
                .is_blacklisted(&interaction_view(ctx.author().id, ctx.guild_id()))
                .await
        }
    };

    Ok(!blocked)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(author: u64, guild: Option<u64>) -> serenity::Message {
        let mut msg = serenity::Message::default();
        msg.author.id = serenity::UserId::new(author);
        msg.guild_id = guild.map(serenity::GuildId::new);
        msg
    }

    #[test]
    fn test_guild_message_maps_to_group_scope() {
        let msg = message(42, Some(7));
        let view = DiscordMessageView(&msg);

        assert_eq!(view.sender_id().unwrap(), "42");
        assert_eq!(view.group_id().unwrap(), Some("7".to_string()));
        assert!(!view.is_private().unwrap());
    }

    #[test]
    fn test_direct_message_maps_to_private_scope() {
        let msg = message(42, None);
        let view = DiscordMessageView(&msg);

        assert_eq!(view.sender_id().unwrap(), "42");
        assert_eq!(view.group_id().unwrap(), None);
        assert!(view.is_private().unwrap());
    }

    #[test]
    fn test_interaction_view_matches_message_view() {
        assert_eq!(
            interaction_view(serenity::UserId::new(42), Some(serenity::GuildId::new(7))),
            InboundMessageView::group("42", "7")
        );
        assert_eq!(
            interaction_view(serenity::UserId::new(42), None),
            InboundMessageView::private("42")
        );
    }
}
