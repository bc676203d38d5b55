/// Sample commands wired into the demo binary.
pub mod build;
pub mod deploy;
pub mod greet;
pub mod test;

use cmdkit::{Command, Registry, RegistryError};

/// Build the demo registry.
///
/// # Errors
///
/// Returns `RegistryError` if a usage line has no command name.
pub fn registry() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    registry.register([
        build::command()?,
        deploy::command()?,
        environment()?,
        greet::command()?,
        test::command()?,
    ]);
    Ok(registry)
}

/// Help-only topic: listed by `help environment`, never dispatched.
fn environment() -> Result<Command, RegistryError> {
    Ok(Command::new("environment")?
        .with_short("environment variables")
        .with_long(
            "
cmdkit consults the following environment variables:

    RUST_LOG
        log filter for diagnostics written to stderr
        (default \"cmdkit=warn\"; -debug forces \"cmdkit=debug\")
",
        ))
}
