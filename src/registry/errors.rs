/// Errors from building registry entries.
use thiserror::Error;

/// Errors that can occur while constructing a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The usage line has no name token.
    #[error("usage line {usage_line:?} does not start with a command name")]
    EmptyName {
        /// The rejected usage line.
        usage_line: String,
    },
}
