/// Errors surfaced by the dispatcher.
use thiserror::Error;

use crate::flags::FlagError;
use crate::help::TemplateError;

/// Everything that can end an invocation with a failure status.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The argument vector held no command name.
    #[error("no command given")]
    NoCommand,

    /// The name is not registered, or names a help-only placeholder.
    #[error("unknown command {name:?}")]
    UnknownCommand {
        /// The unresolved name.
        name: String,
        /// Close runnable names, best first.
        suggestions: Vec<String>,
    },

    /// `help <name>` for a name that is not registered.
    #[error("unknown help topic {name:?}")]
    UnknownHelpTopic {
        /// The unresolved topic.
        name: String,
    },

    /// `help` was given more than one topic.
    #[error("too many arguments given to help")]
    TooManyHelpArgs,

    /// The global flag prefix failed to parse.
    #[error("{0}")]
    GlobalFlags(FlagError),

    /// A handler's own flag parse failed.
    #[error("{command}: {source}")]
    CommandFlags {
        /// Command name.
        command: String,
        /// Usage line, printed after the error.
        usage_line: String,
        /// Rendered flag listing of the command's scope.
        defaults: String,
        /// The parse failure.
        source: FlagError,
    },

    /// A handler returned an error.
    #[error("{command}: {error:#}")]
    Handler {
        /// Command name.
        command: String,
        /// The handler's error, with its context chain.
        error: anyhow::Error,
    },

    /// A help template failed to evaluate.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Writing to an output channel failed.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Exit code and machine-readable code mapping for `DispatchError` variants.
impl DispatchError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NoCommand
            | Self::UnknownCommand { .. }
            | Self::UnknownHelpTopic { .. }
            | Self::TooManyHelpArgs
            | Self::GlobalFlags(_)
            | Self::CommandFlags { .. } => 2,
            Self::Handler { .. } | Self::Template(_) | Self::Io(_) => 1,
        }
    }

    /// Stable `snake_case` code used in the JSON error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoCommand => "no_command",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::UnknownHelpTopic { .. } => "unknown_help_topic",
            Self::TooManyHelpArgs => "too_many_arguments",
            Self::GlobalFlags(_) | Self::CommandFlags { .. } => "flag_error",
            Self::Handler { .. } => "command_failed",
            Self::Template(_) => "template_error",
            Self::Io(_) => "io_error",
        }
    }

    /// Whether the command listing should follow the error message.
    #[must_use]
    pub fn shows_listing(&self) -> bool {
        matches!(
            self,
            Self::NoCommand
                | Self::UnknownCommand { .. }
                | Self::UnknownHelpTopic { .. }
                | Self::GlobalFlags(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_2() {
        assert_eq!(DispatchError::NoCommand.exit_code(), 2);
        assert_eq!(DispatchError::TooManyHelpArgs.exit_code(), 2);
        assert_eq!(
            DispatchError::GlobalFlags(FlagError::Unknown {
                name: "x".to_owned()
            })
            .exit_code(),
            2
        );
    }

    #[test]
    fn test_handler_error_keeps_context_chain() {
        let error = anyhow::anyhow!("disk full").context("writing artifact");
        let err = DispatchError::Handler {
            command: "build".to_owned(),
            error,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "build: writing artifact: disk full");
    }

    #[test]
    fn test_command_flag_error_message() {
        let err = DispatchError::CommandFlags {
            command: "test".to_owned(),
            usage_line: "test [-count n]".to_owned(),
            defaults: String::new(),
            source: FlagError::MissingValue {
                name: "count".to_owned(),
            },
        };
        assert_eq!(err.to_string(), "test: flag needs an argument: -count");
        assert_eq!(err.code(), "flag_error");
        assert!(!err.shows_listing());
    }
}
