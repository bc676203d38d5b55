/// `Dispatcher`: resolves an argument vector to a command and runs it.
///
/// One call to [`Dispatcher::execute`] walks
/// `idle -> parsing global flags -> resolving command -> {help | dispatching}
/// -> terminated`. Nothing is kept between calls: the global scope and the
/// command's scope are cloned from their declarations every time.
use std::io::{self, Write};
use std::process::ExitCode;

use tracing::debug;

use super::context::Context;
use super::errors::DispatchError;
use super::settings::{ErrorFormat, Settings};
use crate::flags::{FlagError, FlagSet};
use crate::help::{self, ListingStyle, Template, TemplateError};
use crate::registry::{Command, HELP_COMMAND, Registry};
use crate::types::ErrorOutput;

/// Outcome of one invocation, as a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(u8);

impl ExitStatus {
    /// Everything went fine.
    pub const SUCCESS: Self = Self(0);
    /// A handler (or rendering) failed.
    pub const FAILURE: Self = Self(1);
    /// The invocation itself was wrong: bad flags, unknown command.
    pub const USAGE: Self = Self(2);

    /// Numeric exit code.
    #[must_use]
    pub fn code(self) -> u8 {
        self.0
    }

    /// Whether the status is `0`.
    #[must_use]
    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.0)
    }
}

/// Resolves and runs commands from a caller-owned [`Registry`].
#[derive(Debug)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    globals: FlagSet,
    settings: Settings,
}

impl<'r> Dispatcher<'r> {
    /// Create a dispatcher named `program` over `registry`.
    #[must_use]
    pub fn new(program: impl Into<String>, registry: &'r Registry) -> Self {
        let settings = Settings::new(program);
        Self {
            registry,
            globals: FlagSet::new(settings.program.clone()),
            settings,
        }
    }

    /// Declare the global flags, recognized before the command name.
    #[must_use]
    pub fn set_flags(mut self, setup: impl FnOnce(&mut FlagSet)) -> Self {
        setup(&mut self.globals);
        self
    }

    /// Replace the listing template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if `text` does not parse.
    pub fn set_usage_template(mut self, text: &str) -> Result<Self, TemplateError> {
        self.settings.usage_template = Some(Template::parse(text)?);
        Ok(self)
    }

    /// Replace the per-command help template.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if `text` does not parse.
    pub fn set_help_template(mut self, text: &str) -> Result<Self, TemplateError> {
        self.settings.help_template = Some(Template::parse(text)?);
        Ok(self)
    }

    /// Choose how the listing is produced.
    #[must_use]
    pub fn listing_style(mut self, style: ListingStyle) -> Self {
        self.settings.listing = style;
        self
    }

    /// Choose how errors are written.
    #[must_use]
    pub fn error_format(mut self, format: ErrorFormat) -> Self {
        self.settings.error_format = format;
        self
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The declared (unparsed) global flag scope.
    #[must_use]
    pub fn global_flags(&self) -> &FlagSet {
        &self.globals
    }

    /// The registry commands are resolved against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    /// Run with the process arguments, stdout and stderr.
    #[must_use]
    pub fn run(&self) -> ExitCode {
        let args: Vec<String> = std::env::args_os()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.execute(&args, &mut stdout.lock(), &mut stderr.lock())
            .into()
    }

    /// Dispatch `args` (program name excluded), writing help and handler
    /// output to `out` and diagnostics to `err`.
    pub fn execute(&self, args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> ExitStatus {
        debug!(state = "idle", ?args, "dispatch started");
        let status = match self.dispatch(args, out, err) {
            Ok(()) => ExitStatus::SUCCESS,
            Err(e) => {
                let status = ExitStatus(e.exit_code());
                if let Err(report_err) = self.report(&e, err) {
                    debug!(error = %report_err, "failed to report error");
                }
                status
            }
        };
        debug!(state = "terminated", code = status.code(), "dispatch finished");
        status
    }

    fn dispatch(
        &self,
        args: &[String],
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<(), DispatchError> {
        if args.is_empty() {
            return Err(DispatchError::NoCommand);
        }

        debug!(state = "parsing_global_flags");
        let mut globals = self.globals.clone();
        match globals.parse(args) {
            Ok(()) => {}
            Err(FlagError::Help) => return self.help(&[], out),
            Err(e) => return Err(DispatchError::GlobalFlags(e)),
        }

        let Some((name, rest)) = globals.args().split_first() else {
            return Err(DispatchError::NoCommand);
        };

        debug!(state = "resolving_command", command = %name);
        if name == HELP_COMMAND {
            return self.help(rest, out);
        }

        let (command, handler) = self
            .registry
            .lookup(name)
            .and_then(|c| c.handler().map(|h| (c, h)))
            .ok_or_else(|| DispatchError::UnknownCommand {
                name: name.clone(),
                suggestions: help::suggest(self.registry, name),
            })?;

        let flags = command.declared_flags();

        debug!(state = "dispatching", command = command.name(), args = ?rest);
        let mut ctx = Context::new(command, &globals, flags, out, err);
        let outcome = handler.run(&mut ctx, rest);
        let flags = ctx.into_flags();

        match outcome {
            Ok(()) => Ok(()),
            Err(error) => match error.downcast::<FlagError>() {
                Ok(FlagError::Help) => self.write_command_help(command, &flags, out),
                Ok(source) => Err(DispatchError::CommandFlags {
                    command: command.name().to_owned(),
                    usage_line: command.usage_line().to_owned(),
                    defaults: flags.defaults(),
                    source,
                }),
                Err(error) => Err(DispatchError::Handler {
                    command: command.name().to_owned(),
                    error,
                }),
            },
        }
    }

    /// The `help` path: bare listing, one command's page, or an error.
    fn help(&self, topics: &[String], out: &mut dyn Write) -> Result<(), DispatchError> {
        debug!(state = "help", ?topics);
        match topics {
            [] => {
                out.write_all(help::render_usage(&self.settings, self.registry)?.as_bytes())?;
                Ok(())
            }
            [topic] => {
                let command = self.registry.lookup(topic).ok_or_else(|| {
                    DispatchError::UnknownHelpTopic {
                        name: topic.clone(),
                    }
                })?;
                self.write_command_help(command, &command.declared_flags(), out)
            }
            _ => Err(DispatchError::TooManyHelpArgs),
        }
    }

    fn write_command_help(
        &self,
        command: &Command,
        flags: &FlagSet,
        out: &mut dyn Write,
    ) -> Result<(), DispatchError> {
        let text = help::render_command_help(&self.settings, command, flags)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Write `e` to the error channel in the configured format.
    fn report(&self, e: &DispatchError, err: &mut dyn Write) -> io::Result<()> {
        if self.settings.error_format == ErrorFormat::Json {
            let envelope = ErrorOutput::from_dispatch_error(e);
            let s = serde_json::to_string_pretty(&envelope).map_err(io::Error::other)?;
            return writeln!(err, "{s}");
        }

        let program = &self.settings.program;
        match e {
            // A bare invocation only gets the listing.
            DispatchError::NoCommand => {}
            DispatchError::UnknownCommand { suggestions, .. } => {
                writeln!(err, "{program}: {e}")?;
                if !suggestions.is_empty() {
                    writeln!(err, "\nDid you mean one of these?")?;
                    for name in suggestions {
                        writeln!(err, "    {name}")?;
                    }
                }
            }
            DispatchError::GlobalFlags(_) => {
                writeln!(err, "{program}: {e}")?;
                if !self.globals.is_empty() {
                    write!(err, "\nGlobal flags:\n{}", self.globals.defaults())?;
                }
            }
            DispatchError::CommandFlags {
                usage_line,
                defaults,
                ..
            } => {
                writeln!(err, "{program}: {e}")?;
                writeln!(err, "usage: {program} {usage_line}")?;
                if !defaults.is_empty() {
                    write!(err, "{defaults}")?;
                }
            }
            DispatchError::TooManyHelpArgs => {
                writeln!(err, "usage: {program} help [command]\n\n{e}.")?;
            }
            _ => writeln!(err, "{program}: {e}")?,
        }

        if e.shows_listing() {
            if !matches!(e, DispatchError::NoCommand) {
                writeln!(err)?;
            }
            match help::render_usage(&self.settings, self.registry) {
                Ok(listing) => err.write_all(listing.as_bytes())?,
                Err(render_err) => writeln!(err, "{program}: {render_err}")?,
            }
        }
        Ok(())
    }
}
