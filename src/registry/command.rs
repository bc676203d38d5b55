/// The `Command` entity and the `Handler` capability it dispatches to.
use std::fmt;

use super::errors::RegistryError;
use crate::dispatch::Context;
use crate::flags::FlagSet;

/// Capability implemented by every runnable command.
///
/// The dispatcher calls [`Handler::declare_flags`] on a fresh copy of the
/// command's flag scope, then [`Handler::run`] with every token after the
/// command name. Those tokens are not parsed by the dispatcher; the handler
/// decides when (and whether) to parse them with
/// [`Context::parse_flags`].
pub trait Handler {
    /// Declare per-command flags before `run`. Flags declared here also show
    /// up in `help <command>`.
    fn declare_flags(&self, _flags: &mut FlagSet) {}

    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Any error is reported on the error channel and ends the invocation
    /// with a failure status. Returning a [`crate::FlagError`] additionally
    /// prints the command's usage.
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>, &[String]) -> anyhow::Result<()>,
{
    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()> {
        self(ctx, args)
    }
}

/// One invocable action: usage line, help texts, flag scope and an optional
/// handler. Without a handler the command is a help-only placeholder.
pub struct Command {
    usage_line: String,
    short: String,
    long: String,
    handler: Option<Box<dyn Handler>>,
    flags: FlagSet,
}

impl Command {
    /// Create a command from its usage line (`"name [args]"`).
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::EmptyName` if the usage line is blank.
    pub fn new(usage_line: impl Into<String>) -> Result<Self, RegistryError> {
        let usage_line = usage_line.into().trim().to_owned();
        let Some(name) = usage_line.split_whitespace().next() else {
            return Err(RegistryError::EmptyName { usage_line });
        };
        let flags = FlagSet::new(name);
        Ok(Self {
            usage_line,
            short: String::new(),
            long: String::new(),
            handler: None,
            flags,
        })
    }

    /// Set the one-line description.
    #[must_use]
    pub fn with_short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Set the long description.
    #[must_use]
    pub fn with_long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    /// Attach a handler, making the command runnable.
    #[must_use]
    pub fn with_handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Attach a closure handler.
    #[must_use]
    pub fn with_fn<F>(self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, &[String]) -> anyhow::Result<()> + 'static,
    {
        self.with_handler(f)
    }

    /// Declare flags on the command's own scope up front.
    #[must_use]
    pub fn with_flags(mut self, setup: impl FnOnce(&mut FlagSet)) -> Self {
        setup(&mut self.flags);
        self
    }

    /// Canonical name: first token of the usage line.
    #[must_use]
    pub fn name(&self) -> &str {
        self.usage_line
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }

    /// Full usage line.
    #[must_use]
    pub fn usage_line(&self) -> &str {
        &self.usage_line
    }

    /// One-line description.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.short
    }

    /// Long description.
    #[must_use]
    pub fn long(&self) -> &str {
        &self.long
    }

    /// Whether the command has a handler and may be dispatched.
    #[must_use]
    pub fn runnable(&self) -> bool {
        self.handler.is_some()
    }

    /// The handler, if any.
    #[must_use]
    pub fn handler(&self) -> Option<&dyn Handler> {
        self.handler.as_deref()
    }

    /// Flags declared up front with [`Command::with_flags`].
    #[must_use]
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// A fresh copy of the command's flag scope with the handler's
    /// [`Handler::declare_flags`] applied.
    #[must_use]
    pub fn declared_flags(&self) -> FlagSet {
        let mut flags = self.flags.clone();
        if let Some(handler) = self.handler() {
            handler.declare_flags(&mut flags);
        }
        flags
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("usage_line", &self.usage_line)
            .field("short", &self.short)
            .field("runnable", &self.runnable())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Handler for Noop {
        fn declare_flags(&self, flags: &mut FlagSet) {
            flags.bool("dry-run", false, "do nothing");
        }

        fn run(&self, _ctx: &mut Context<'_>, _args: &[String]) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_name_is_first_token() {
        let cmd = Command::new("  build [-o output] [packages]  ").unwrap();
        assert_eq!(cmd.name(), "build");
        assert_eq!(cmd.usage_line(), "build [-o output] [packages]");
    }

    #[test]
    fn test_blank_usage_line_rejected() {
        assert!(matches!(
            Command::new("   "),
            Err(RegistryError::EmptyName { .. })
        ));
    }

    #[test]
    fn test_placeholder_is_not_runnable() {
        let cmd = Command::new("topics").unwrap().with_long("About topics.");
        assert!(!cmd.runnable());
        assert!(cmd.handler().is_none());
        assert_eq!(cmd.long(), "About topics.");
    }

    #[test]
    fn test_declared_flags_merges_both_sources() {
        let cmd = Command::new("deploy target")
            .unwrap()
            .with_flags(|fs| {
                fs.string("env", "staging", "target environment");
            })
            .with_handler(Noop);

        let flags = cmd.declared_flags();
        assert!(flags.lookup("env").is_some());
        assert!(flags.lookup("dry-run").is_some());
        // The stored scope itself is untouched.
        assert!(cmd.flags().lookup("dry-run").is_none());
    }

    #[test]
    fn test_closure_handler_is_runnable() {
        let cmd = Command::new("echo [text]")
            .unwrap()
            .with_short("print text")
            .with_fn(|_ctx, _args| Ok(()));
        assert!(cmd.runnable());
        assert_eq!(cmd.short(), "print text");
    }
}
