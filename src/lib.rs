#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! cmdkit: a command registry, dispatcher and help renderer for small
//! command-line tools.
//!
//! A caller builds a [`Registry`] of [`Command`]s, wraps it in a
//! [`Dispatcher`] with optional global flags and help templates, and hands it
//! the argument vector. The dispatcher resolves the command name, gives the
//! handler a fresh per-command [`FlagSet`], and maps the outcome to an exit
//! status.
//!
//! ```no_run
//! use cmdkit::{Command, Dispatcher, Registry};
//!
//! let mut registry = Registry::new();
//! registry.register([Command::new("greet name")
//!     .unwrap()
//!     .with_short("say hello")
//!     .with_fn(|ctx, args| {
//!         let rest = ctx.parse_flags(args)?;
//!         writeln!(ctx.out(), "Hello, {}!", rest.first().map_or("world", String::as_str))?;
//!         Ok(())
//!     })]);
//!
//! let dispatcher = Dispatcher::new("demo", &registry).set_flags(|flags| {
//!     flags.bool("verbose", false, "print more");
//! });
//! std::process::exit(i32::from(dispatcher.execute(
//!     &["greet".to_owned(), "Go".to_owned()],
//!     &mut std::io::stdout(),
//!     &mut std::io::stderr(),
//! ).code()));
//! ```

pub mod dispatch;
pub mod flags;
pub mod help;
pub mod registry;
pub mod types;

pub use dispatch::{Context, DispatchError, Dispatcher, ErrorFormat, ExitStatus, Settings};
pub use flags::{FlagError, FlagKind, FlagSet, FlagValue};
pub use help::{ListingStyle, Template, TemplateError};
pub use registry::{Command, Handler, Registry, RegistryError};
