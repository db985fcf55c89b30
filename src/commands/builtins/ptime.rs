use crate::commands::registry::{BuiltinCommand, BuiltinContext, Flow};
use crate::errors::ShellResult;

pub struct PtimeCommand;

impl BuiltinCommand for PtimeCommand {
    fn name(&self) -> &'static str {
        "ptime"
    }

    fn execute(&self, _args: &[String], ctx: &mut BuiltinContext<'_>) -> ShellResult<Flow> {
        writeln!(
            ctx.out,
            "Time spent executing child processes: {}",
            ctx.elapsed
        )?;
        ctx.out.flush()?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::ElapsedChildTime;
    use std::time::Duration;

    #[test]
    fn reports_accumulated_time() {
        let mut elapsed = ElapsedChildTime::new();
        elapsed.add(Duration::from_micros(1_002_003));
        let mut out = Vec::new();
        let mut ctx = BuiltinContext {
            elapsed: &elapsed,
            out: &mut out,
        };

        let flow = PtimeCommand
            .execute(&["ptime".to_string()], &mut ctx)
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Time spent executing child processes: 1 seconds, 2 milliseconds, and 3 microseconds\n"
        );
    }
}
