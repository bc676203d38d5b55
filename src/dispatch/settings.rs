/// Dispatcher settings: program name, templates, output styles.
use crate::help::{ListingStyle, Template};

/// How errors are written to the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorFormat {
    /// `program: message`, followed by the listing where relevant.
    #[default]
    Text,
    /// Pretty-printed JSON error envelope, nothing else.
    Json,
}

/// Settings consulted at render and report time.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Program name shown in usage text and error prefixes.
    pub program: String,
    /// Listing template; `None` uses [`crate::help::DEFAULT_USAGE_TEMPLATE`].
    pub usage_template: Option<Template>,
    /// Per-command help template; `None` uses
    /// [`crate::help::DEFAULT_HELP_TEMPLATE`].
    pub help_template: Option<Template>,
    /// How the listing is produced.
    pub listing: ListingStyle,
    /// How errors are written.
    pub error_format: ErrorFormat,
}

impl Settings {
    /// Default settings for `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            usage_template: None,
            help_template: None,
            listing: ListingStyle::default(),
            error_format: ErrorFormat::default(),
        }
    }
}
