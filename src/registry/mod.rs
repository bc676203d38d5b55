/// Registry layer: command entities, the handler capability, sorted lookup.
pub mod command;
pub mod errors;
pub mod index;

pub use command::{Command, Handler};
pub use errors::RegistryError;
pub use index::{HELP_COMMAND, Registry};
