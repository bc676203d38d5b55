/// `FlagSet`: a named scope of typed options, parsed with clap's builder API.
///
/// A scope is declared incrementally (`bool`, `string`, `int`, `uint`,
/// `float`) and parsed once against an argument slice. The clap command is
/// assembled at parse time, so flags can be added right up to the moment a
/// handler decides to parse.
use std::fmt::{self, Write as _};
use std::num::FpCategory;

use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, value_parser};

use super::errors::FlagError;
use super::normalize;

/// The type of a declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    String,
    Int,
    Uint,
    Float,
}

impl FlagKind {
    /// Type name shown in flag listings.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
        }
    }
}

/// A typed flag value (default or parsed).
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl FlagValue {
    /// The kind this value belongs to.
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::Bool(_) => FlagKind::Bool,
            Self::Str(_) => FlagKind::String,
            Self::Int(_) => FlagKind::Int,
            Self::Uint(_) => FlagKind::Uint,
            Self::Float(_) => FlagKind::Float,
        }
    }

    /// Whether this is the zero value of its type (not shown as a default).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Str(s) => s.is_empty(),
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(f) => f.classify() == FpCategory::Zero,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

/// One declared flag.
#[derive(Debug, Clone)]
pub struct FlagDef {
    /// Name without dashes.
    pub name: String,
    /// Value used when the flag is absent.
    pub default: FlagValue,
    /// One-line description.
    pub usage: String,
}

impl FlagDef {
    pub(crate) fn new(name: &str, default: FlagValue, usage: &str) -> Self {
        Self {
            name: name.to_owned(),
            default,
            usage: usage.to_owned(),
        }
    }

    /// The flag's type.
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }

    fn to_arg(&self) -> Arg {
        let arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone())
            .action(ArgAction::Set)
            .allow_hyphen_values(true)
            .default_value(self.default.to_string());

        match self.kind() {
            FlagKind::Bool => arg
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            FlagKind::String => arg.value_parser(value_parser!(String)),
            FlagKind::Int => arg.value_parser(value_parser!(i64)),
            FlagKind::Uint => arg.value_parser(value_parser!(u64)),
            FlagKind::Float => arg.value_parser(value_parser!(f64)),
        }
    }
}

/// A named scope of typed flags.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    defs: Vec<FlagDef>,
    /// Declaration mistakes, reported by the next `parse`.
    invalid: Vec<FlagError>,
    matches: Option<ArgMatches>,
    args: Vec<String>,
}

impl FlagSet {
    /// Create an empty scope. `name` is used in logs and error context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Scope name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a boolean flag.
    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> &mut Self {
        self.define(name, FlagValue::Bool(default), usage)
    }

    /// Declare a string flag.
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> &mut Self {
        self.define(name, FlagValue::Str(default.to_owned()), usage)
    }

    /// Declare a signed integer flag.
    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> &mut Self {
        self.define(name, FlagValue::Int(default), usage)
    }

    /// Declare an unsigned integer flag.
    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> &mut Self {
        self.define(name, FlagValue::Uint(default), usage)
    }

    /// Declare a floating-point flag.
    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> &mut Self {
        self.define(name, FlagValue::Float(default), usage)
    }

    fn define(&mut self, name: &str, default: FlagValue, usage: &str) -> &mut Self {
        if !valid_name(name) {
            tracing::debug!(scope = %self.name, flag = name, "invalid flag name");
            self.invalid.push(FlagError::BadName {
                name: name.to_owned(),
            });
        } else if self.lookup(name).is_some() {
            tracing::debug!(scope = %self.name, flag = name, "flag redefined");
            self.invalid.push(FlagError::Redefined {
                name: name.to_owned(),
            });
        } else {
            self.defs.push(FlagDef::new(name, default, usage));
        }
        self
    }

    /// Look up a declared flag by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&FlagDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// All declared flags, in declaration order.
    #[must_use]
    pub fn flags(&self) -> &[FlagDef] {
        &self.defs
    }

    /// Whether no flags are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Parse `args` against the declared flags.
    ///
    /// Flags are read up to the first positional argument; everything from
    /// there on is available through [`FlagSet::args`]. Parsing again replaces
    /// the previous result.
    ///
    /// # Errors
    ///
    /// Returns `FlagError` for undeclared, redefined or badly named flags,
    /// missing or malformed values, and `FlagError::Help` for an undeclared `-h`/`-help`.
    pub fn parse(&mut self, args: &[String]) -> Result<(), FlagError> {
        if let Some(err) = self.invalid.first() {
            return Err(err.clone());
        }

        let split = normalize::split(args, &self.defs)?;
        let matches = self
            .command()
            .try_get_matches_from(split.flags)
            .map_err(|e| FlagError::from_clap(&e))?;

        tracing::debug!(scope = %self.name, positional = split.rest.len(), "flags parsed");
        self.matches = Some(matches);
        self.args = split.rest;
        Ok(())
    }

    fn command(&self) -> clap::Command {
        self.defs.iter().fold(
            clap::Command::new(self.name.clone())
                .no_binary_name(true)
                .disable_help_flag(true)
                .disable_version_flag(true)
                .args_override_self(true),
            |cmd, def| cmd.arg(def.to_arg()),
        )
    }

    /// Whether [`FlagSet::parse`] has succeeded on this scope.
    #[must_use]
    pub fn parsed(&self) -> bool {
        self.matches.is_some()
    }

    /// Whether the flag was given explicitly on the command line.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.matches.as_ref().is_some_and(|m| {
            self.lookup(name).is_some()
                && m.value_source(name) == Some(ValueSource::CommandLine)
        })
    }

    /// Current value of a flag: the parsed value, or its default before
    /// parsing. `None` if the flag is not declared.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<FlagValue> {
        let def = self.lookup(name)?;
        let Some(m) = &self.matches else {
            return Some(def.default.clone());
        };

        let parsed = match def.kind() {
            FlagKind::Bool => one::<bool>(m, name).map(FlagValue::Bool),
            FlagKind::String => one::<String>(m, name).map(FlagValue::Str),
            FlagKind::Int => one::<i64>(m, name).map(FlagValue::Int),
            FlagKind::Uint => one::<u64>(m, name).map(FlagValue::Uint),
            FlagKind::Float => one::<f64>(m, name).map(FlagValue::Float),
        };
        Some(parsed.unwrap_or_else(|| def.default.clone()))
    }

    /// Value of a boolean flag.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.value(name)? {
            FlagValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Value of a string flag.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            FlagValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Value of a signed integer flag.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            FlagValue::Int(n) => Some(n),
            _ => None,
        }
    }

    /// Value of an unsigned integer flag.
    #[must_use]
    pub fn get_uint(&self, name: &str) -> Option<u64> {
        match self.value(name)? {
            FlagValue::Uint(n) => Some(n),
            _ => None,
        }
    }

    /// Value of a floating-point flag.
    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        match self.value(name)? {
            FlagValue::Float(x) => Some(x),
            _ => None,
        }
    }

    /// Positional arguments left after the last parse.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The `i`-th positional argument.
    #[must_use]
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn narg(&self) -> usize {
        self.args.len()
    }

    /// Render the declared flags as an indented listing, sorted by name.
    ///
    /// ```text
    ///   -count int
    ///         number of runs (default 1)
    ///   -verbose
    ///         print more
    /// ```
    #[must_use]
    pub fn defaults(&self) -> String {
        let mut defs: Vec<&FlagDef> = self.defs.iter().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = String::new();
        for def in defs {
            let _ = write!(out, "  -{}", def.name);
            if def.kind() != FlagKind::Bool {
                let _ = write!(out, " {}", def.kind().type_name());
            }
            out.push_str("\n        ");
            out.push_str(&def.usage);
            if !def.default.is_zero() {
                match &def.default {
                    FlagValue::Str(s) => {
                        let _ = write!(out, " (default {s:?})");
                    }
                    other => {
                        let _ = write!(out, " (default {other})");
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains(|c: char| c == '=' || c.is_whitespace())
}

fn one<T: Clone + Send + Sync + 'static>(m: &ArgMatches, name: &str) -> Option<T> {
    m.try_get_one::<T>(name).ok().flatten().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| (*s).to_owned()).collect()
    }

    fn scope() -> FlagSet {
        let mut fs = FlagSet::new("test");
        fs.bool("verbose", false, "print more")
            .string("output", "a.out", "output path")
            .int("offset", 0, "signed offset")
            .uint("count", 1, "number of runs")
            .float("ratio", 0.5, "mix ratio");
        fs
    }

    #[test]
    fn test_defaults_before_parse() {
        let fs = scope();
        assert!(!fs.parsed());
        assert_eq!(fs.get_bool("verbose"), Some(false));
        assert_eq!(fs.get_string("output").as_deref(), Some("a.out"));
        assert_eq!(fs.get_uint("count"), Some(1));
        assert_eq!(fs.get_bool("missing"), None);
    }

    #[test]
    fn test_parse_all_kinds() {
        let mut fs = scope();
        fs.parse(&strings(&[
            "-verbose",
            "-output",
            "bin/x",
            "--offset=-4",
            "-count",
            "3",
            "-ratio=0.25",
            "pkg",
            "-ignored",
        ]))
        .unwrap();

        assert!(fs.parsed());
        assert_eq!(fs.get_bool("verbose"), Some(true));
        assert_eq!(fs.get_string("output").as_deref(), Some("bin/x"));
        assert_eq!(fs.get_int("offset"), Some(-4));
        assert_eq!(fs.get_uint("count"), Some(3));
        assert_eq!(fs.get_float("ratio"), Some(0.25));
        assert_eq!(fs.args(), strings(&["pkg", "-ignored"]).as_slice());
        assert_eq!(fs.arg(0), Some("pkg"));
        assert_eq!(fs.narg(), 2);
    }

    #[test]
    fn test_bool_explicit_false() {
        let mut fs = scope();
        fs.parse(&strings(&["-verbose=false"])).unwrap();
        assert_eq!(fs.get_bool("verbose"), Some(false));
        assert!(fs.is_set("verbose"));
    }

    #[test]
    fn test_is_set_only_for_command_line() {
        let mut fs = scope();
        fs.parse(&strings(&["-count", "2"])).unwrap();
        assert!(fs.is_set("count"));
        assert!(!fs.is_set("output"));
        assert_eq!(fs.get_string("output").as_deref(), Some("a.out"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let mut fs = scope();
        fs.parse(&strings(&["-count", "2", "-count", "5"])).unwrap();
        assert_eq!(fs.get_uint("count"), Some(5));
    }

    #[test]
    fn test_invalid_value() {
        let mut fs = scope();
        let err = fs.parse(&strings(&["-count", "many"])).unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { .. }));
        assert!(!fs.parsed());
    }

    #[test]
    fn test_negative_uint_rejected() {
        let mut fs = scope();
        let err = fs.parse(&strings(&["-count=-1"])).unwrap_err();
        assert!(matches!(err, FlagError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_flag() {
        let mut fs = scope();
        let err = fs.parse(&strings(&["-colour"])).unwrap_err();
        assert_eq!(
            err,
            FlagError::Unknown {
                name: "colour".to_owned()
            }
        );
    }

    #[test]
    fn test_redefinition_fails_parse() {
        let mut fs = scope();
        fs.bool("verbose", true, "again");
        assert_eq!(
            fs.parse(&[]),
            Err(FlagError::Redefined {
                name: "verbose".to_owned()
            })
        );
    }

    #[test]
    fn test_unusable_names_fail_parse() {
        for name in ["", "-v", "a=b", "two words"] {
            let mut fs = FlagSet::new("test");
            fs.bool(name, false, "");
            assert_eq!(
                fs.parse(&strings(&["a"])),
                Err(FlagError::BadName {
                    name: name.to_owned()
                }),
                "{name:?}"
            );
            assert!(fs.lookup(name).is_none());
        }
    }

    #[test]
    fn test_declared_help_is_a_normal_flag() {
        let mut fs = FlagSet::new("test");
        fs.bool("help", false, "own help");
        fs.parse(&strings(&["-help"])).unwrap();
        assert_eq!(fs.get_bool("help"), Some(true));
    }

    #[test]
    fn test_empty_scope_passes_positionals() {
        let mut fs = FlagSet::new("empty");
        fs.parse(&strings(&["a", "b"])).unwrap();
        assert_eq!(fs.args(), strings(&["a", "b"]).as_slice());
    }

    #[test]
    fn test_defaults_listing() {
        let text = scope().defaults();
        assert!(text.starts_with("  -count uint\n        number of runs (default 1)\n"));
        assert!(text.contains("  -output string\n        output path (default \"a.out\")\n"));
        assert!(text.contains("  -verbose\n        print more\n"));
        assert!(text.contains("  -offset int\n        signed offset\n"));
    }
}
