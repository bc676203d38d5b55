/// Per-invocation context handed to a command's handler.
use std::io::Write;

use crate::flags::{FlagError, FlagSet};
use crate::registry::Command;

/// What a handler sees while it runs: the resolved command, the parsed
/// global flags, its own (fresh) flag scope and the two output channels.
pub struct Context<'a> {
    command: &'a Command,
    globals: &'a FlagSet,
    flags: FlagSet,
    out: &'a mut dyn Write,
    err: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        command: &'a Command,
        globals: &'a FlagSet,
        flags: FlagSet,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
    ) -> Self {
        Self {
            command,
            globals,
            flags,
            out,
            err,
        }
    }

    /// The command being run.
    #[must_use]
    pub fn command(&self) -> &Command {
        self.command
    }

    /// Global flags, already parsed.
    #[must_use]
    pub fn globals(&self) -> &FlagSet {
        self.globals
    }

    /// The command's flag scope.
    #[must_use]
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// The command's flag scope, for late declarations.
    pub fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Parse `args` with the command's flag scope and return the positional
    /// arguments that follow the flags.
    ///
    /// # Errors
    ///
    /// Returns the `FlagError` from the parse. Propagating it out of the
    /// handler makes the dispatcher print the command's usage.
    pub fn parse_flags(&mut self, args: &[String]) -> Result<Vec<String>, FlagError> {
        self.flags.parse(args)?;
        Ok(self.flags.args().to_vec())
    }

    /// Output channel (stdout in a real process).
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    /// Error channel (stderr in a real process).
    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    pub(crate) fn into_flags(self) -> FlagSet {
        self.flags
    }
}
