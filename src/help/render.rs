/// Help rendering: the command listing and per-command help pages.
///
/// Rendering is a pure function of the settings and the registry; nothing is
/// printed here.
use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};

use super::errors::TemplateError;
use super::template::Template;
use crate::dispatch::Settings;
use crate::flags::FlagSet;
use crate::registry::{Command, Registry};
use crate::types::{CommandHelp, CommandPage, CommandSummary, UsageData};

/// Default listing: a banner, then `<padded-name> <short>` for every runnable
/// command.
pub const DEFAULT_USAGE_TEMPLATE: &str = r#"Usage:

    {{.Program}} command [arguments]

The commands are:
{{range .Commands}}{{if .Runnable}}
    {{.Name | printf "%-11s"}} {{.Short}}{{end}}{{end}}

Use "{{.Program}} help [command]" for more information about a command.
"#;

/// Default per-command help: usage line, flags, long description.
pub const DEFAULT_HELP_TEMPLATE: &str = "usage: {{.Program}} {{.UsageLine}}\n\
{{if .Flags}}\nFlags:\n{{.Flags}}{{end}}\
{{if .Long}}\n{{.Long | trim}}\n{{end}}";

/// How the command listing is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingStyle {
    /// Evaluate the usage template.
    #[default]
    Template,
    /// Aligned table of runnable commands.
    Table,
    /// JSON array of runnable commands.
    Json,
}

/// Render the command listing.
///
/// # Errors
///
/// Returns `TemplateError` if the usage template fails to evaluate.
pub fn render_usage(settings: &Settings, registry: &Registry) -> Result<String, TemplateError> {
    match settings.listing {
        ListingStyle::Template => {
            let data = UsageData::new(&settings.program, registry);
            match &settings.usage_template {
                Some(template) => template.render(&data),
                None => Template::parse(DEFAULT_USAGE_TEMPLATE)?.render(&data),
            }
        }
        ListingStyle::Table => Ok(render_table(&settings.program, registry)),
        ListingStyle::Json => {
            let summaries: Vec<CommandSummary> =
                registry.runnable().map(CommandSummary::from).collect();
            serde_json::to_string_pretty(&summaries)
                .map(|s| s + "\n")
                .map_err(|e| TemplateError::exec(e.to_string()))
        }
    }
}

/// Render help for one command. `flags` is the command's declared scope.
///
/// # Errors
///
/// Returns `TemplateError` if the help template fails to evaluate.
pub fn render_command_help(
    settings: &Settings,
    command: &Command,
    flags: &FlagSet,
) -> Result<String, TemplateError> {
    let page = CommandPage {
        program: settings.program.clone(),
        command: CommandHelp::new(command, flags),
    };
    match &settings.help_template {
        Some(template) => template.render(&page),
        None => Template::parse(DEFAULT_HELP_TEMPLATE)?.render(&page),
    }
}

fn render_table(program: &str, registry: &Registry) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["COMMAND", "DESCRIPTION"]);
    for cmd in registry.runnable() {
        table.add_row([cmd.name(), cmd.short()]);
    }

    format!(
        "Usage: {program} command [arguments]\n\n{table}\n\n\
         Use \"{program} help [command]\" for more information about a command.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register([
            Command::new("test [packages]")
                .unwrap()
                .with_short("run tests")
                .with_fn(|_ctx, _args| Ok(())),
            Command::new("build [-o output] [packages]")
                .unwrap()
                .with_short("compile packages")
                .with_flags(|fs| {
                    fs.string("o", "", "output file");
                })
                .with_fn(|_ctx, _args| Ok(())),
            Command::new("topics")
                .unwrap()
                .with_short("placeholder")
                .with_long("\nAbout topics.\n"),
        ]);
        registry
    }

    #[test]
    fn test_default_listing() {
        let settings = Settings::new("tool");
        let text = render_usage(&settings, &registry()).unwrap();
        assert_eq!(
            text,
            "Usage:\n\n    tool command [arguments]\n\nThe commands are:\n\n    \
             build       compile packages\n    \
             test        run tests\n\n\
             Use \"tool help [command]\" for more information about a command.\n"
        );
        assert!(!text.contains("topics"));
    }

    #[test]
    fn test_custom_usage_template() {
        let mut settings = Settings::new("tool");
        settings.usage_template = Some(
            Template::parse("{{range .Commands}}{{.Name}};{{end}}").unwrap(),
        );
        assert_eq!(
            render_usage(&settings, &registry()).unwrap(),
            "build;test;topics;"
        );
    }

    #[test]
    fn test_table_listing_skips_placeholders() {
        let mut settings = Settings::new("tool");
        settings.listing = ListingStyle::Table;
        let text = render_usage(&settings, &registry()).unwrap();
        assert!(text.contains("COMMAND"));
        assert!(text.contains("compile packages"));
        assert!(!text.contains("placeholder"));
    }

    #[test]
    fn test_json_listing() {
        let mut settings = Settings::new("tool");
        settings.listing = ListingStyle::Json;
        let text = render_usage(&settings, &registry()).unwrap();
        let parsed: Vec<CommandSummary> = serde_json::from_str(&text).unwrap();
        let names: Vec<&str> = parsed.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["build", "test"]);
    }

    #[test]
    fn test_command_help_with_flags() {
        let settings = Settings::new("tool");
        let registry = registry();
        let build = registry.lookup("build").unwrap();
        let text = render_command_help(&settings, build, &build.declared_flags()).unwrap();
        assert_eq!(
            text,
            "usage: tool build [-o output] [packages]\n\nFlags:\n  -o string\n        output file\n"
        );
    }

    #[test]
    fn test_command_help_for_placeholder() {
        let settings = Settings::new("tool");
        let registry = registry();
        let topics = registry.lookup("topics").unwrap();
        let text = render_command_help(&settings, topics, topics.flags()).unwrap();
        assert_eq!(text, "usage: tool topics\n\nAbout topics.\n");
    }

    #[test]
    fn test_default_templates_parse() {
        assert!(Template::parse(DEFAULT_USAGE_TEMPLATE).is_ok());
        assert!(Template::parse(DEFAULT_HELP_TEMPLATE).is_ok());
    }
}
