// Discord command for blacklist administration.
//
// **Notice the pattern:**
// 1. Extract primitive data from Discord types (the raw line, admin flag)
// 2. Call the core command router
// 3. Send the reply it produced
//
// This layer is THIN - parsing and business rules live in the core.

use crate::core::blacklist::{handle_command, BlacklistService, ErrorScrubber};
use crate::discord::moderation::outbound::send_reply;
use crate::infra::blacklist::JsonBlacklistStore;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands and event handlers.
pub struct Data {
    pub blacklist: Arc<BlacklistService<JsonBlacklistStore>>,
    pub scrubber: Arc<ErrorScrubber>,
}

/// Manage the user and server blacklists.
///
/// Usage: blacklist add|remove <user|group> <id>, blacklist list|clear [user|group|all], blacklist help
#[poise::command(prefix_command, slash_command)]
pub async fn blacklist(
    ctx: Context<'_>,
    #[rest]
    #[description = "Subcommand and arguments, e.g. `add user 123456789`"]
    args: Option<String>,
) -> Result<(), Error> {
    let is_admin = ctx.framework().options().owners.contains(&ctx.author().id);
    let line = command_line(args.as_deref());

    let reply = handle_command(&ctx.data().blacklist, &line, is_admin).await;
    send_reply(ctx, reply).await
}

/// Rebuild the full command line the router expects.
fn command_line(args: Option<&str>) -> String {
    match args.map(str::trim).filter(|rest| !rest.is_empty()) {
        Some(rest) => format!("blacklist {}", rest),
        None => "blacklist".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_rebuild() {
        assert_eq!(command_line(None), "blacklist");
        assert_eq!(command_line(Some("   ")), "blacklist");
        assert_eq!(
            command_line(Some(" add user 42 ")),
            "blacklist add user 42"
        );
    }
}
