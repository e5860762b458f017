// Blacklist domain models - data structures for the moderation filter.
//
// These are pure domain types with no Discord dependencies.
// The Discord layer builds `InboundMessageView`s and `OutboundResult`s from
// its own message types and hands them to the core.

use std::fmt;

use super::error_scrubber::DEFAULT_ERROR_PATTERNS;

/// Notice sent instead of a leaked internal error.
pub const DEFAULT_ERROR_INTERCEPT_MESSAGE: &str =
    "⚠️ System busy: an internal error was intercepted. Please try again later.";

pub const DEFAULT_MAX_BLACKLIST_SIZE: usize = 1000;

// ============================================================================
// KINDS AND SCOPES
// ============================================================================

/// Which block-list an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlacklistKind {
    /// Blocked senders
    User,
    /// Blocked group channels (Discord servers)
    Group,
}

impl BlacklistKind {
    pub const ALL: [BlacklistKind; 2] = [BlacklistKind::User, BlacklistKind::Group];

    /// Parse a command token (`user` / `group`, case-insensitive).
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "user" => Some(BlacklistKind::User),
            "group" => Some(BlacklistKind::Group),
            _ => None,
        }
    }

    /// Name of the list field inside the persisted document.
    pub fn list_key(self) -> &'static str {
        match self {
            BlacklistKind::User => "users",
            BlacklistKind::Group => "groups",
        }
    }

    /// File name of the persisted document.
    pub fn file_name(self) -> &'static str {
        match self {
            BlacklistKind::User => "user_blacklist.json",
            BlacklistKind::Group => "group_blacklist.json",
        }
    }
}

impl fmt::Display for BlacklistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistKind::User => write!(f, "user"),
            BlacklistKind::Group => write!(f, "group"),
        }
    }
}

/// Target of `list` and `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    User,
    Group,
    All,
}

impl ListScope {
    /// Parse an optional scope token; a missing token means `all`.
    pub fn parse(token: Option<&str>) -> Option<Self> {
        match token.map(str::to_lowercase).as_deref() {
            None | Some("all") => Some(ListScope::All),
            Some("user") => Some(ListScope::User),
            Some("group") => Some(ListScope::Group),
            Some(_) => None,
        }
    }

    pub fn kinds(self) -> &'static [BlacklistKind] {
        match self {
            ListScope::User => &[BlacklistKind::User],
            ListScope::Group => &[BlacklistKind::Group],
            ListScope::All => &BlacklistKind::ALL,
        }
    }
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of adding an id to a block-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResult {
    Added,
    /// Already present; nothing changed
    Duplicate,
    /// The list is full; nothing changed
    AtCapacity,
}

/// Result of removing an id from a block-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveResult {
    Removed,
    NotPresent,
}

/// How many entries a `clear` removed from each list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearedCounts {
    pub users: usize,
    pub groups: usize,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Filter configuration. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct BlacklistConfig {
    /// Only admins may run blacklist commands
    pub admin_only: bool,
    /// Capacity shared by the user and the group list
    pub max_blacklist_size: usize,
    pub intercept_private_chat: bool,
    pub intercept_group_chat: bool,
    /// Log every interception and scrub at info level
    pub show_interception_log: bool,
    pub error_intercept_enabled: bool,
    pub error_intercept_message: String,
    /// Regular expressions recognizing leaked internal errors
    pub error_intercept_patterns: Vec<String>,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            admin_only: true,
            max_blacklist_size: DEFAULT_MAX_BLACKLIST_SIZE,
            intercept_private_chat: true,
            intercept_group_chat: true,
            show_interception_log: true,
            error_intercept_enabled: true,
            error_intercept_message: DEFAULT_ERROR_INTERCEPT_MESSAGE.to_string(),
            error_intercept_patterns: DEFAULT_ERROR_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl BlacklistConfig {
    /// Build a config from a key lookup (normally the process environment).
    ///
    /// Missing keys keep their defaults; unparsable values are logged and
    /// ignored. The pattern list is not read here because it comes from a file.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let read_bool = |key: &str, target: &mut bool| {
            if let Some(raw) = lookup(key) {
                match parse_bool(&raw) {
                    Some(value) => *target = value,
                    None => tracing::warn!("Ignoring invalid boolean for {}: {:?}", key, raw),
                }
            }
        };

        read_bool("BLACKLIST_ADMIN_ONLY", &mut config.admin_only);
        read_bool(
            "BLACKLIST_INTERCEPT_PRIVATE",
            &mut config.intercept_private_chat,
        );
        read_bool("BLACKLIST_INTERCEPT_GROUP", &mut config.intercept_group_chat);
        read_bool("BLACKLIST_SHOW_LOG", &mut config.show_interception_log);
        read_bool(
            "ERROR_INTERCEPT_ENABLED",
            &mut config.error_intercept_enabled,
        );

        if let Some(raw) = lookup("BLACKLIST_MAX_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(size) => config.max_blacklist_size = size,
                Err(_) => tracing::warn!("Ignoring invalid BLACKLIST_MAX_SIZE: {:?}", raw),
            }
        }

        if let Some(message) = lookup("ERROR_INTERCEPT_MESSAGE") {
            config.error_intercept_message = message;
        }

        config
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// MESSAGE VIEWS
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("Message field unavailable: {0}")]
pub struct ViewError(pub String);

/// Read-only projection of an inbound message.
///
/// Every accessor may fail; the policy engine treats any failure as
/// "not blacklisted".
pub trait InboundMessage {
    fn sender_id(&self) -> Result<String, ViewError>;
    fn group_id(&self) -> Result<Option<String>, ViewError>;
    fn is_private(&self) -> Result<bool, ViewError>;
}

/// Plain owned message view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessageView {
    pub sender_id: String,
    pub group_id: Option<String>,
    pub is_private: bool,
}

impl InboundMessageView {
    pub fn private(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            group_id: None,
            is_private: true,
        }
    }

    pub fn group(sender_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            group_id: Some(group_id.into()),
            is_private: false,
        }
    }
}

impl InboundMessage for InboundMessageView {
    fn sender_id(&self) -> Result<String, ViewError> {
        Ok(self.sender_id.clone())
    }

    fn group_id(&self) -> Result<Option<String>, ViewError> {
        Ok(self.group_id.clone())
    }

    fn is_private(&self) -> Result<bool, ViewError> {
        Ok(self.is_private)
    }
}

/// One piece of an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    /// Anything that is not plain text (images, files, embeds)
    Attachment(String),
}

/// Mutable projection of an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutboundResult {
    pub segments: Vec<Segment>,
}

impl OutboundResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Text(text.into())],
        }
    }

    /// Text segments joined by newlines, without a trailing newline.
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(text) => Some(text.as_str()),
                Segment::Attachment(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
