use crate::errors::ShellResult;
use crate::timing::ElapsedChildTime;
use once_cell::sync::Lazy;
use std::io::Write;

/// What the interpreter does after a built-in runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State a built-in may look at, and where it writes its report
pub struct BuiltinContext<'a> {
    pub elapsed: &'a ElapsedChildTime,
    pub out: &'a mut dyn Write,
}

/// Trait that all builtin commands must implement
pub trait BuiltinCommand: Send + Sync {
    /// The stage name that triggers this command
    fn name(&self) -> &'static str;

    /// Run in place of spawning a process.
    /// args[0] is the command name itself
    fn execute(&self, args: &[String], ctx: &mut BuiltinContext<'_>) -> ShellResult<Flow>;
}

/// Central registry for all builtin commands
pub struct BuiltinRegistry {
    commands: Vec<Box<dyn BuiltinCommand>>,
}

impl Default for BuiltinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    pub fn register<C: BuiltinCommand + 'static>(&mut self, cmd: C) {
        self.commands.push(Box::new(cmd));
    }

    /// Names are matched exactly
    pub fn get(&self, name: &str) -> Option<&dyn BuiltinCommand> {
        self.commands
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Get all builtin command names (for completion)
    pub fn builtin_names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }
}

/// Global registry instance
pub static BUILTINS: Lazy<BuiltinRegistry> = Lazy::new(|| {
    let mut registry = BuiltinRegistry::new();

    registry.register(super::builtins::PtimeCommand);
    registry.register(super::builtins::ExitCommand);

    registry
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knows_ptime_and_exit() {
        assert!(BUILTINS.is_builtin("ptime"));
        assert!(BUILTINS.is_builtin("exit"));
        assert_eq!(BUILTINS.builtin_names(), ["ptime", "exit"]);
    }

    #[test]
    fn matches_names_exactly() {
        assert!(!BUILTINS.is_builtin("Exit"));
        assert!(!BUILTINS.is_builtin("ptime2"));
        assert!(!BUILTINS.is_builtin("ls"));
    }
}
