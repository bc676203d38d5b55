/// Help layer: template engine, listing and per-command rendering, suggestions.
pub mod errors;
pub mod render;
pub mod suggest;
pub mod template;

pub use errors::TemplateError;
pub use render::{
    DEFAULT_HELP_TEMPLATE, DEFAULT_USAGE_TEMPLATE, ListingStyle, render_command_help,
    render_usage,
};
pub use suggest::suggest;
pub use template::Template;
