/// Shared serializable output types.
///
/// These are what help templates are evaluated against and what gets written
/// as JSON (listings and error envelopes). They are decoupled from the
/// internal `Command` / `Registry` types.
use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchError;
use crate::flags::FlagSet;
use crate::registry::{Command, Registry};

/// One command as seen by help templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandHelp {
    /// Canonical name (first token of the usage line).
    pub name: String,
    /// Full usage line, e.g. `build [-o output] [packages]`.
    pub usage_line: String,
    /// One-line description.
    pub short: String,
    /// Long description.
    pub long: String,
    /// Whether the command can be dispatched.
    pub runnable: bool,
    /// Rendered flag listing, empty when the command declares none up front.
    pub flags: String,
}

impl CommandHelp {
    /// Build from a command and its declared flag scope.
    #[must_use]
    pub fn new(command: &Command, flags: &FlagSet) -> Self {
        Self {
            name: command.name().to_owned(),
            usage_line: command.usage_line().to_owned(),
            short: command.short().to_owned(),
            long: command.long().to_owned(),
            runnable: command.runnable(),
            flags: flags.defaults(),
        }
    }
}

/// Data for the usage (listing) template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UsageData {
    /// Program name.
    pub program: String,
    /// Every registered command, sorted by name, placeholders included.
    pub commands: Vec<CommandHelp>,
}

impl UsageData {
    /// Snapshot the registry for rendering.
    #[must_use]
    pub fn new(program: &str, registry: &Registry) -> Self {
        Self {
            program: program.to_owned(),
            commands: registry
                .commands()
                .iter()
                .map(|c| CommandHelp::new(c, &c.declared_flags()))
                .collect(),
        }
    }
}

/// Data for the per-command help template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandPage {
    /// Program name.
    pub program: String,
    /// The command's fields, flattened to the top level.
    #[serde(flatten)]
    pub command: CommandHelp,
}

/// A runnable command in the JSON listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSummary {
    /// Canonical name.
    pub name: String,
    /// One-line description.
    pub short: String,
    /// Full usage line.
    pub usage: String,
}

impl From<&Command> for CommandSummary {
    fn from(command: &Command) -> Self {
        Self {
            name: command.name().to_owned(),
            short: command.short().to_owned(),
            usage: command.usage_line().to_owned(),
        }
    }
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (`snake_case`).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Process exit code the error maps to.
    pub exit_code: u8,
    /// Close command names (for unknown-command errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
}

impl ErrorOutput {
    /// Construct from a `DispatchError`.
    #[must_use]
    pub fn from_dispatch_error(err: &DispatchError) -> Self {
        let suggestions = match err {
            DispatchError::UnknownCommand { suggestions, .. } if !suggestions.is_empty() => {
                Some(suggestions.clone())
            }
            _ => None,
        };
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
                exit_code: err.exit_code(),
                suggestions,
            },
        }
    }
}
