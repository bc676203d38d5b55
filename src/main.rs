#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! cmdkit: a small build-tool style front end over the command registry.

mod commands;

use std::process::ExitCode;

use cmdkit::{Dispatcher, ErrorFormat, FlagSet};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("cmdkit=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cmdkit=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn global_flags(flags: &mut FlagSet) {
    flags
        .bool("verbose", false, "report progress on standard error")
        .bool("debug", false, "enable debug logging")
        .bool("json", false, "report errors as JSON");
}

fn main() -> ExitCode {
    let registry = match commands::registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("cmdkit: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut dispatcher = Dispatcher::new("cmdkit", &registry).set_flags(global_flags);

    // Logging and the error format are fixed before dispatch, so read the
    // global prefix once up front. Parse errors are reported by the dispatcher.
    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let mut probe = dispatcher.global_flags().clone();
    let parsed = probe.parse(&args).is_ok();
    let enabled = |name: &str| parsed && probe.get_bool(name).unwrap_or(false);

    init_tracing(enabled("debug"));
    if enabled("json") {
        dispatcher = dispatcher.error_format(ErrorFormat::Json);
    }

    dispatcher.run()
}
