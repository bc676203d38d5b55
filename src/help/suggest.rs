/// "Did you mean" suggestions for unknown command names.
use nucleo_matcher::{
    Matcher, Utf32Str,
    pattern::{CaseMatching, Normalization, Pattern},
};

use crate::registry::Registry;

/// At most this many names are suggested.
const MAX_SUGGESTIONS: usize = 3;

/// Runnable command names that fuzzy-match `name`, best match first.
#[must_use]
pub fn suggest(registry: &Registry, name: &str) -> Vec<String> {
    if name.is_empty() {
        return Vec::new();
    }

    let pattern = Pattern::parse(name, CaseMatching::Smart, Normalization::Smart);
    let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);

    let mut scored: Vec<(&str, u32)> = registry
        .runnable()
        .filter_map(|cmd| {
            let mut buf = Vec::new();
            let haystack = Utf32Str::new(cmd.name(), &mut buf);
            pattern
                .score(haystack, &mut matcher)
                .map(|score| (cmd.name(), score))
        })
        .collect();

    // Best score first, ties broken by name for stable output.
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(name, _)| name.to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Command;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(["build", "bench", "test", "deploy"].map(|name| {
            Command::new(name).unwrap().with_fn(|_ctx, _args| Ok(()))
        }));
        registry.register([Command::new("buildinfo").unwrap()]);
        registry
    }

    #[test]
    fn test_subsequence_typo() {
        let names = suggest(&registry(), "bld");
        assert_eq!(names.first().map(String::as_str), Some("build"));
    }

    #[test]
    fn test_placeholders_never_suggested() {
        assert!(!suggest(&registry(), "buildinfo").contains(&"buildinfo".to_owned()));
    }

    #[test]
    fn test_no_match() {
        assert!(suggest(&registry(), "zzz").is_empty());
        assert!(suggest(&registry(), "").is_empty());
    }
}
