//! Detection and masking of internal error text in outbound replies.
//!
//! Replies are matched against an ordered list of case-insensitive regular
//! expressions (with `.` matching newlines). Any match replaces the whole
//! reply with a single user-facing notice.

use regex::{Regex, RegexBuilder};

use super::blacklist_models::{
    BlacklistConfig, OutboundResult, Segment, DEFAULT_ERROR_INTERCEPT_MESSAGE,
};

/// Built-in signatures of leaked internal errors.
pub const DEFAULT_ERROR_PATTERNS: &[&str] = &[
    r"AstrBot 请求失败",
    r"request failed[:：]",
    r"请求失败[:：]",
    r"exception (raised|occurred) while (invoking|calling) plugin .+?",
    r"在调用插件 .+? 时出现异常",
    r"error type[:：].*?error message[:：]",
    r"错误类型[:：].*?错误信息[:：]",
    r"Traceback \(most recent call last\)",
    r"thread '.+?' panicked at",
    r"stack backtrace:",
];

pub struct ErrorScrubber {
    enabled: bool,
    replacement: String,
    patterns: Vec<Regex>,
    show_log: bool,
}

impl ErrorScrubber {
    /// Compile the configured patterns. Fails on the first invalid pattern.
    pub fn new(config: &BlacklistConfig) -> Result<Self, regex::Error> {
        let mut scrubber = Self::with_patterns(
            config.error_intercept_patterns.as_slice(),
            &config.error_intercept_message,
        )?;
        scrubber.enabled = config.error_intercept_enabled;
        scrubber.show_log = config.show_interception_log;
        Ok(scrubber)
    }

    pub fn with_patterns(
        patterns: &[impl AsRef<str>],
        replacement: &str,
    ) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern.as_ref())
                    .case_insensitive(true)
                    .dot_matches_new_line(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let replacement = if replacement.is_empty() {
            DEFAULT_ERROR_INTERCEPT_MESSAGE.to_string()
        } else {
            replacement.to_string()
        };

        Ok(Self {
            enabled: true,
            replacement,
            patterns,
            show_log: false,
        })
    }

    #[cfg(test)]
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }

    /// Replace `result` with the notice if its text looks like a leaked error.
    ///
    /// Returns `true` when the reply was rewritten. Non-text segments are
    /// dropped along with the text.
    pub fn scrub(&self, result: &mut OutboundResult) -> bool {
        if !self.enabled {
            return false;
        }

        let mut combined = String::new();
        for segment in &result.segments {
            if let Segment::Text(text) = segment {
                combined.push_str(text);
                combined.push('\n');
            }
        }

        if combined.is_empty() || !self.matches(&combined) {
            return false;
        }

        result.segments = vec![Segment::Text(self.replacement.clone())];
        if self.show_log {
            tracing::info!("Intercepted internal error output and replaced it with a notice");
        }
        true
    }
}
