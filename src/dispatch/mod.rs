/// Dispatch layer: argument resolution, handler invocation, error reporting.
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod settings;

pub use context::Context;
pub use dispatcher::{Dispatcher, ExitStatus};
pub use errors::DispatchError;
pub use settings::{ErrorFormat, Settings};
