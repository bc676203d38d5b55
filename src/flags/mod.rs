/// Flag layer: typed option scopes (global and per-command).
pub mod errors;
mod normalize;
pub mod set;

pub use errors::FlagError;
pub use set::{FlagDef, FlagKind, FlagSet, FlagValue};
