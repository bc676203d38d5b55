/// `deploy` command: pretend to ship a target to an environment.
use anyhow::bail;
use cmdkit::{Command, Context, RegistryError};

const ENVIRONMENTS: [&str; 2] = ["staging", "production"];

/// The `deploy` registry entry.
///
/// # Errors
///
/// Never fails in practice; the usage line is fixed.
pub fn command() -> Result<Command, RegistryError> {
    Ok(Command::new("deploy [-env name] [-dry-run] target")?
        .with_short("deploy a target")
        .with_long(
            "
Deploy ships the named target to an environment, staging by default.

With -dry-run the plan is printed and nothing is deployed.
",
        )
        .with_flags(|flags| {
            flags
                .string("env", "staging", "target environment (staging or production)")
                .bool("dry-run", false, "print the plan without deploying");
        })
        .with_fn(run))
}

fn run(ctx: &mut Context<'_>, args: &[String]) -> anyhow::Result<()> {
    let rest = ctx.parse_flags(args)?;
    let [target] = rest.as_slice() else {
        bail!("expected exactly one target, got {}", rest.len());
    };

    let env = ctx.flags().get_string("env").unwrap_or_default();
    if !ENVIRONMENTS.contains(&env.as_str()) {
        bail!("unknown environment {env:?}");
    }

    if ctx.flags().get_bool("dry-run").unwrap_or(false) {
        writeln!(ctx.out(), "would deploy {target} to {env}")?;
    } else {
        writeln!(ctx.out(), "deployed {target} to {env}")?;
    }
    Ok(())
}
