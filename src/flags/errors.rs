/// Errors from the flag layer.
use thiserror::Error;

/// Errors that can occur while declaring or parsing a flag scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// A flag was given that the scope never declared.
    #[error("flag provided but not defined: -{name}")]
    Unknown {
        /// Flag name as written, without dashes.
        name: String,
    },

    /// A non-boolean flag appeared last with no value after it.
    #[error("flag needs an argument: -{name}")]
    MissingValue {
        /// Flag name.
        name: String,
    },

    /// The value could not be converted to the flag's type.
    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        /// Flag name.
        name: String,
        /// Raw value from the command line.
        value: String,
        /// Why conversion failed.
        reason: String,
    },

    /// The same name was declared twice in one scope.
    #[error("flag redefined: {name}")]
    Redefined {
        /// The duplicated flag name.
        name: String,
    },

    /// A flag was declared with a name that cannot be written on a command
    /// line (empty, leading `-`, `=` or whitespace).
    #[error("flag name {name:?} is not valid")]
    BadName {
        /// The rejected name.
        name: String,
    },

    /// A token looked like a flag but is not one (`---x`, `-=x`).
    #[error("bad flag syntax: {token}")]
    BadSyntax {
        /// The offending token.
        token: String,
    },

    /// `-h` or `-help` was given and the scope does not define it.
    #[error("help requested")]
    Help,

    /// Any other failure reported by the underlying parser.
    #[error("{0}")]
    Other(String),
}

impl FlagError {
    /// Return the CLI exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Help => 0,
            _ => 2,
        }
    }

    /// Convert a clap parse failure into a `FlagError`.
    ///
    /// Unknown names and missing values are caught before clap runs, so what
    /// reaches here is almost always a value that failed its value parser.
    pub(crate) fn from_clap(err: &clap::Error) -> Self {
        use clap::error::{ContextKind, ContextValue, ErrorKind};

        let context_str = |kind| match err.get(kind) {
            Some(ContextValue::String(s)) => Some(s.clone()),
            _ => None,
        };

        match err.kind() {
            ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
                let name = context_str(ContextKind::InvalidArg)
                    .map(|arg| arg_name(&arg))
                    .unwrap_or_default();
                let value = context_str(ContextKind::InvalidValue).unwrap_or_default();
                let reason = std::error::Error::source(err)
                    .map_or_else(|| err.kind().to_string(), ToString::to_string);
                Self::InvalidValue {
                    name,
                    value,
                    reason,
                }
            }
            ErrorKind::UnknownArgument => Self::Unknown {
                name: context_str(ContextKind::InvalidArg)
                    .map(|arg| arg_name(&arg))
                    .unwrap_or_default(),
            },
            kind => Self::Other(kind.to_string()),
        }
    }
}

/// Extract the bare flag name from clap's rendering (`--count <count>`).
fn arg_name(rendered: &str) -> String {
    rendered
        .trim_start_matches('-')
        .split(|c: char| c.is_whitespace() || c == '=' || c == '[')
        .next()
        .unwrap_or_default()
        .to_owned()
}
