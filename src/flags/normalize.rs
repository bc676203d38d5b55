/// Token normalization: split an argument vector into its flag prefix and
/// positional tail, rewriting the prefix into the form clap expects.
///
/// Accepted spellings for a flag named `name`:
///
/// - `-name value` / `--name value`
/// - `-name=value` / `--name=value`
/// - `-name` alone for booleans (sets `true`)
///
/// Every flag in the prefix is rewritten to `--name=value` (or `--name` for a
/// bare boolean) so clap never has to guess whether a following token is a
/// value. Scanning stops at the first non-flag token, at a lone `-`, or after
/// `--`, which is consumed.
use super::errors::FlagError;
use super::set::{FlagDef, FlagKind};

/// Result of [`split`].
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Split {
    /// Flag tokens in clap's long form.
    pub flags: Vec<String>,
    /// Positional arguments, untouched.
    pub rest: Vec<String>,
}

/// Names that request help unless the scope declares them itself.
const HELP_NAMES: [&str; 2] = ["h", "help"];

/// Split `args` against the declared flags in `defs`.
///
/// # Errors
///
/// - `FlagError::Unknown` for an undeclared flag
/// - `FlagError::MissingValue` when a value-taking flag ends the vector
/// - `FlagError::BadSyntax` for tokens like `---x` or `-=x`
/// - `FlagError::Help` for an undeclared `-h` / `-help`
pub(crate) fn split(args: &[String], defs: &[FlagDef]) -> Result<Split, FlagError> {
    let mut out = Split::default();
    let mut i = 0;

    while i < args.len() {
        let token = args[i].as_str();

        if token == "--" {
            out.rest.extend_from_slice(&args[i + 1..]);
            return Ok(out);
        }
        if token == "-" || !token.starts_with('-') {
            break;
        }

        let body = token
            .strip_prefix("--")
            .or_else(|| token.strip_prefix('-'))
            .unwrap_or(token);
        if body.is_empty() || body.starts_with('-') || body.starts_with('=') {
            return Err(FlagError::BadSyntax {
                token: token.to_owned(),
            });
        }

        let (name, inline_value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let Some(def) = defs.iter().find(|d| d.name == name) else {
            if HELP_NAMES.contains(&name) {
                return Err(FlagError::Help);
            }
            return Err(FlagError::Unknown {
                name: name.to_owned(),
            });
        };

        match (def.kind(), inline_value) {
            (_, Some(value)) => out.flags.push(format!("--{name}={value}")),
            (FlagKind::Bool, None) => out.flags.push(format!("--{name}")),
            (_, None) => {
                let Some(value) = args.get(i + 1) else {
                    return Err(FlagError::MissingValue {
                        name: name.to_owned(),
                    });
                };
                out.flags.push(format!("--{name}={value}"));
                i += 1;
            }
        }
        i += 1;
    }

    out.rest.extend_from_slice(&args[i..]);
    Ok(out)
}
