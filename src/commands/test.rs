/// `test` command: pretend to run package tests.
use anyhow::bail;
use cmdkit::{Command, Context, FlagSet, Handler, RegistryError};

struct Test;

impl Handler for Test {
    fn declare_flags(&self, flags: &mut FlagSet) {
        flags
            .string("run", "", "run only tests matching this pattern")
            .uint("count", 1, "run each test n times");
    }

    fn run(&self, ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()> {
        let mut packages = ctx.parse_flags(args)?;
        if packages.is_empty() {
            packages.push(".".to_owned());
        }

        let count = ctx.flags().get_uint("count").unwrap_or(1);
        if count == 0 {
            bail!("-count must be at least 1");
        }
        let filter = match ctx.flags().get_string("run") {
            Some(pattern) if !pattern.is_empty() => format!(", matching {pattern:?}"),
            _ => String::new(),
        };

        for package in &packages {
            writeln!(ctx.out(), "ok  \t{package}\t({count} run(s){filter})")?;
        }
        Ok(())
    }
}

/// The `test` registry entry.
///
/// # Errors
///
/// Never fails in practice; the usage line is fixed.
pub fn command() -> Result<Command, RegistryError> {
    Ok(Command::new("test [-run pattern] [-count n] [packages]")?
        .with_short("test packages")
        .with_long(
            "
Test runs the tests of the named packages, or of the current directory
if none are given.
",
        )
        .with_handler(Test))
}
