/// `greet` command: print a greeting for a name.
use anyhow::Context as _;
use cmdkit::{Command, Context, FlagSet, Handler, RegistryError};

struct Greet;

impl Handler for Greet {
    fn declare_flags(&self, flags: &mut FlagSet) {
        flags.bool("shout", false, "print the greeting in upper case");
    }

    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()> {
        let rest = ctx.parse_flags(args)?;
        let name = rest.first().context("missing name")?;

        let mut line = format!("Hello, {name}!");
        if ctx.flags().get_bool("shout").unwrap_or(false) {
            line = line.to_uppercase();
        }
        writeln!(ctx.out(), "{line}")?;
        Ok(())
    }
}

/// The `greet` registry entry.
///
/// # Errors
///
/// Never fails in practice; the usage line is fixed.
pub fn command() -> Result<Command, RegistryError> {
    Ok(Command::new("greet [-shout] name")?
        .with_short("print a greeting")
        .with_long(
            "
Greet prints \"Hello, <name>!\" on standard output.

The -shout flag prints it in upper case.
",
        )
        .with_handler(Greet))
}
