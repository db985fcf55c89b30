use crate::commands::registry::{BuiltinCommand, BuiltinContext, Flow};
use crate::errors::ShellResult;

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, _args: &[String], _ctx: &mut BuiltinContext<'_>) -> ShellResult<Flow> {
        Ok(Flow::Exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ElapsedChildTime;

    #[test]
    fn stops_the_loop_and_prints_nothing() {
        let elapsed = ElapsedChildTime::new();
        let mut out = Vec::new();
        let mut ctx = BuiltinContext {
            elapsed: &elapsed,
            out: &mut out,
        };
        let args = vec!["exit".to_string(), "3".to_string()];
        assert_eq!(ExitCommand.execute(&args, &mut ctx).unwrap(), Flow::Exit);
        assert!(out.is_empty());
    }
}
