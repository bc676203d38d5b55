/// `Registry`: commands kept sorted by name for binary-search lookup.
///
/// Registration appends and re-sorts, so the ordering invariant holds before
/// any lookup can run. The sort is stable: when a name is registered more than
/// once, the earliest registration sorts first and is the one `lookup` returns.
use super::command::Command;

/// Name reserved for the built-in help path.
pub const HELP_COMMAND: &str = "help";

/// Ordered, caller-owned collection of commands.
#[derive(Debug, Default)]
pub struct Registry {
    commands: Vec<Command>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append commands and restore name order.
    ///
    /// Duplicate names are accepted and logged; the first registration wins.
    pub fn register<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = Command>,
    {
        for cmd in commands {
            if cmd.name() == HELP_COMMAND {
                tracing::warn!("command `help` is shadowed by the built-in help path");
            }
            if self.commands.iter().any(|c| c.name() == cmd.name()) {
                tracing::warn!(
                    command = cmd.name(),
                    "duplicate command name; the first registration wins"
                );
            }
            self.commands.push(cmd);
        }
        self.sort();
    }

    /// Sort by name, ascending byte order. Stable and idempotent.
    pub fn sort(&mut self) {
        self.commands.sort_by(|a, b| a.name().cmp(b.name()));
    }

    /// Find the command named `name`. O(log n).
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Command> {
        let idx = self.commands.partition_point(|c| c.name() < name);
        let found = self.commands.get(idx).filter(|c| c.name() == name);
        tracing::debug!(command = name, found = found.is_some(), "lookup");
        found
    }

    /// All commands, sorted by name.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Commands that have a handler, sorted by name.
    pub fn runnable(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.runnable())
    }

    /// Names registered more than once.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .commands
            .windows(2)
            .filter(|pair| pair[0].name() == pair[1].name())
            .map(|pair| pair[0].name())
            .collect();
        names.dedup();
        names
    }

    /// Number of registered commands (placeholders included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(usage: &str) -> Command {
        Command::new(usage).unwrap().with_fn(|_ctx, _args| Ok(()))
    }

    fn names(registry: &Registry) -> Vec<&str> {
        registry.commands().iter().map(Command::name).collect()
    }

    #[test]
    fn test_register_sorts_by_name() {
        let mut registry = Registry::new();
        registry.register([cmd("b"), cmd("a"), cmd("c")]);
        assert_eq!(names(&registry), ["a", "b", "c"]);
    }

    #[test]
    fn test_order_independent_of_call_order() {
        let mut one = Registry::new();
        one.register([cmd("c")]);
        one.register([cmd("a"), cmd("b")]);

        let mut two = Registry::new();
        two.register([cmd("b")]);
        two.register([cmd("c")]);
        two.register([cmd("a")]);

        assert_eq!(names(&one), names(&two));
    }

    #[test]
    fn test_lookup_finds_every_name() {
        let mut registry = Registry::new();
        let all = ["vet", "build", "test", "env", "fmt", "clean", "doc", "run", "get"];
        registry.register(all.iter().map(|n| cmd(&format!("{n} [args]"))));
        for name in all {
            assert_eq!(registry.lookup(name).map(Command::name), Some(name));
        }
    }

    #[test]
    fn test_lookup_missing() {
        let mut registry = Registry::new();
        registry.register([cmd("build"), cmd("test")]);
        assert!(registry.lookup("deploy").is_none());
        assert!(registry.lookup("").is_none());
        assert!(registry.lookup("zzz").is_none());
        assert!(registry.lookup("a").is_none());
        assert!(Registry::new().lookup("build").is_none());
    }

    #[test]
    fn test_lookup_returns_placeholders_too() {
        let mut registry = Registry::new();
        registry.register([cmd("build"), Command::new("topics").unwrap()]);
        let found = registry.lookup("topics").unwrap();
        assert!(!found.runnable());
        assert_eq!(registry.runnable().count(), 1);
    }

    #[test]
    fn test_duplicates_first_registration_wins() {
        let mut registry = Registry::new();
        registry.register([
            cmd("run").with_short("first"),
            cmd("build"),
            cmd("run").with_short("second"),
        ]);
        assert_eq!(registry.duplicates(), ["run"]);
        assert_eq!(registry.lookup("run").unwrap().short(), "first");
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut registry = Registry::new();
        registry.register([cmd("b"), cmd("a")]);
        registry.sort();
        registry.sort();
        assert_eq!(names(&registry), ["a", "b"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
    }
}
