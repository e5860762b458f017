// Discord-side moderation glue: inbound interception and outbound scrubbing.

pub mod interceptor;
pub mod outbound;
