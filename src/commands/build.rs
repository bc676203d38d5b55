/// `build` command: pretend to compile packages.
///
/// Flags are declared inside the handler, after dispatch, so they do not
/// appear on the `help build` page.
use cmdkit::{Command, Context, RegistryError};
use tracing::debug;

/// The `build` registry entry.
///
/// # Errors
///
/// Never fails in practice; the usage line is fixed.
pub fn command() -> Result<Command, RegistryError> {
    Ok(Command::new("build [-o output] [-release] [packages]")?
        .with_short("compile packages")
        .with_long(
            "
Build compiles the named packages, or the current directory if none
are given.

The -o flag names the output artifact. The -release flag selects the
optimized profile. With the global -verbose flag each package is
reported on standard error as it is compiled.
",
        )
        .with_fn(run))
}

fn run(ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()> {
    ctx.flags_mut()
        .string("o", "", "write the artifact to this file")
        .bool("release", false, "build with optimizations");
    let mut packages = ctx.parse_flags(args)?;
    if packages.is_empty() {
        packages.push(".".to_owned());
    }

    let profile = if ctx.flags().get_bool("release").unwrap_or(false) {
        "release"
    } else {
        "debug"
    };
    let output = ctx
        .flags()
        .get_string("o")
        .filter(|o| !o.is_empty())
        .unwrap_or_else(|| "a.out".to_owned());
    let verbose = ctx.globals().get_bool("verbose").unwrap_or(false);

    for package in &packages {
        debug!(package = %package, profile, "compiling");
        if verbose {
            writeln!(ctx.err(), "compiling {package} ({profile})")?;
        }
    }
    writeln!(
        ctx.out(),
        "built {} package(s) [{profile}] -> {output}",
        packages.len()
    )?;
    Ok(())
}
