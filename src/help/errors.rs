/// Errors from the help renderer.
use thiserror::Error;

/// Errors that can occur while parsing or evaluating a help template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template text is malformed.
    #[error("template:{offset}: {message}")]
    Parse {
        /// Byte offset of the offending action.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// A pipeline names a function the engine does not provide.
    #[error("template: function {name:?} not defined")]
    UnknownFunction {
        /// The unknown name.
        name: String,
    },

    /// Evaluation failed (missing field, bad printf argument, ...).
    #[error("template: {0}")]
    Exec(String),
}

impl TemplateError {
    pub(crate) fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn exec(message: impl Into<String>) -> Self {
        Self::Exec(message.into())
    }
}
