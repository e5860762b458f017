// Admin command router - parses `blacklist <subcommand> [args]` lines and
// turns the service outcomes into reply text.
//
// Platform-agnostic: the Discord layer passes in the raw command line and
// the caller's admin capability, and sends back whatever string we return.

use super::blacklist_models::{AddResult, BlacklistKind, ListScope, RemoveResult};
use super::blacklist_service::BlacklistService;
use super::blacklist_store::BlacklistStore;

const ADD_USAGE: &str = "blacklist add <user|group> <id>";
const REMOVE_USAGE: &str = "blacklist remove <user|group> <id>";

/// A parsed blacklist command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlacklistCommand {
    Help,
    Add { kind: BlacklistKind, id: String },
    Remove { kind: BlacklistKind, id: String },
    List(ListScope),
    Clear(ListScope),
}

/// Malformed input. The message is the reply shown to the admin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("❌ Expected a type and an id. Usage: {0}")]
    MissingArguments(&'static str),
    #[error("❌ Invalid type, use user or group")]
    InvalidKind,
    #[error("❌ Invalid type, use user, group or all")]
    InvalidScope,
}

/// Parse a whole command line. The first token is the command name itself.
///
/// A missing or unknown subcommand parses as `Help`.
pub fn parse_command(line: &str) -> Result<BlacklistCommand, CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(subcommand) = tokens.get(1) else {
        return Ok(BlacklistCommand::Help);
    };
    let args = &tokens[2..];

    match subcommand.to_lowercase().as_str() {
        "add" => {
            let (kind, id) = parse_target(args, ADD_USAGE)?;
            Ok(BlacklistCommand::Add { kind, id })
        }
        "remove" => {
            let (kind, id) = parse_target(args, REMOVE_USAGE)?;
            Ok(BlacklistCommand::Remove { kind, id })
        }
        "list" => parse_scope(args).map(BlacklistCommand::List),
        "clear" => parse_scope(args).map(BlacklistCommand::Clear),
        _ => Ok(BlacklistCommand::Help),
    }
}

fn parse_target(
    args: &[&str],
    usage: &'static str,
) -> Result<(BlacklistKind, String), CommandError> {
    let [kind, id] = args else {
        return Err(CommandError::MissingArguments(usage));
    };
    let kind = BlacklistKind::parse(kind).ok_or(CommandError::InvalidKind)?;
    Ok((kind, id.to_string()))
}

fn parse_scope(args: &[&str]) -> Result<ListScope, CommandError> {
    ListScope::parse(args.first().copied()).ok_or(CommandError::InvalidScope)
}

/// Handle one admin command line and produce the reply.
pub async fn handle_command<S: BlacklistStore>(
    service: &BlacklistService<S>,
    line: &str,
    is_admin: bool,
) -> String {
    if service.config().admin_only && !is_admin {
        return "❌ Only administrators can use blacklist commands".to_string();
    }

    match parse_command(line) {
        Ok(command) => execute(service, command).await,
        Err(e) => e.to_string(),
    }
}

async fn execute<S: BlacklistStore>(
    service: &BlacklistService<S>,
    command: BlacklistCommand,
) -> String {
    let max = service.config().max_blacklist_size;

    match command {
        BlacklistCommand::Help => render_help(service).await,

        BlacklistCommand::Add { kind, id } => match service.add(kind, &id).await {
            AddResult::Added => format!("✅ Added {} {} to the blacklist", kind, id),
            AddResult::Duplicate => format!("⚠️ {} {} is already blacklisted", label(kind), id),
            AddResult::AtCapacity => format!(
                "❌ The {} blacklist is full ({} entries)",
                kind, max
            ),
        },

        BlacklistCommand::Remove { kind, id } => match service.remove(kind, &id).await {
            RemoveResult::Removed => format!("✅ Removed {} {} from the blacklist", kind, id),
            RemoveResult::NotPresent => {
                format!("⚠️ {} {} is not blacklisted", label(kind), id)
            }
        },

        BlacklistCommand::List(ListScope::All) => {
            let users = service.sorted_ids(BlacklistKind::User).await;
            let groups = service.sorted_ids(BlacklistKind::Group).await;

            let mut reply = String::from("📊 Blacklist summary:\n");
            reply.push_str(&format!("👤 Users: {}/{}\n", users.len(), max));
            reply.push_str(&format!("👥 Groups: {}/{}\n", groups.len(), max));
            reply.push_str(&format!("\n👤 User list:\n{}\n", join_or_empty(&users)));
            reply.push_str(&format!("\n👥 Group list:\n{}", join_or_empty(&groups)));
            reply
        }

        BlacklistCommand::List(scope) => {
            let kind = match scope {
                ListScope::Group => BlacklistKind::Group,
                _ => BlacklistKind::User,
            };
            let ids = service.sorted_ids(kind).await;
            if ids.is_empty() {
                format!("📋 {} blacklist is empty", label(kind))
            } else {
                format!(
                    "📋 {} blacklist ({}/{}):\n{}",
                    label(kind),
                    ids.len(),
                    max,
                    ids.join("\n")
                )
            }
        }

        BlacklistCommand::Clear(scope) => {
            let counts = service.clear(scope).await;
            match scope {
                ListScope::User => format!(
                    "🗑️ Cleared the user blacklist, removed {} user(s)",
                    counts.users
                ),
                ListScope::Group => format!(
                    "🗑️ Cleared the group blacklist, removed {} group(s)",
                    counts.groups
                ),
                ListScope::All => format!(
                    "🗑️ Cleared all blacklists, removed {} user(s) and {} group(s)",
                    counts.users, counts.groups
                ),
            }
        }
    }
}

async fn render_help<S: BlacklistStore>(service: &BlacklistService<S>) -> String {
    let config = service.config();
    let users = service.count(BlacklistKind::User).await;
    let groups = service.count(BlacklistKind::Group).await;

    format!(
        "🛡️ Blacklist help\n\
         \n\
         📋 Usage: blacklist <subcommand> [args]\n\
         \n\
         🔧 Subcommands:\n\
         \u{20} add <type> <id>     - Add to the blacklist\n\
         \u{20}   type: user or group\n\
         \u{20}   e.g. blacklist add user 123456789\n\
         \u{20} remove <type> <id>  - Remove from the blacklist\n\
         \u{20}   e.g. blacklist remove group 987654321\n\
         \u{20} list [type]         - Show the blacklist (user, group or all)\n\
         \u{20} clear [type]        - Empty the blacklist (user, group or all)\n\
         \u{20} help                - Show this message\n\
         \n\
         📊 Status:\n\
         \u{20} Users: {}/{}\n\
         \u{20} Groups: {}/{}\n\
         \u{20} Admin only: {}\n\
         \u{20} Intercept private chats: {}\n\
         \u{20} Intercept group chats: {}\n\
         \u{20} Log interceptions: {}\n\
         \u{20} Mask internal errors: {}",
        users,
        config.max_blacklist_size,
        groups,
        config.max_blacklist_size,
        yes_no(config.admin_only),
        yes_no(config.intercept_private_chat),
        yes_no(config.intercept_group_chat),
        yes_no(config.show_interception_log),
        yes_no(config.error_intercept_enabled),
    )
}

fn label(kind: BlacklistKind) -> &'static str {
    match kind {
        BlacklistKind::User => "User",
        BlacklistKind::Group => "Group",
    }
}

fn join_or_empty(ids: &[String]) -> String {
    if ids.is_empty() {
        "(empty)".to_string()
    } else {
        ids.join("\n")
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
