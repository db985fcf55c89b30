use crate::commands::{self, BuiltinContext, Flow, BUILTINS};
use crate::errors::{ProcessError, ShellResult};
use crate::pipeline::{Pipeline, PlannedStage};
use crate::timing::ElapsedChildTime;
use nix::sys::wait::WaitStatus;
use std::io::Write;
use std::time::Instant;
use tracing::debug;

/// How one stage ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Exited(i32),
    Signaled(String),
    /// Handled in-process, nothing was spawned
    Builtin,
    WaitFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStatus {
    pub name: String,
    pub outcome: StageOutcome,
}

/// What happened to one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub flow: Flow,
    /// One entry per stage that was reached, in order
    pub stages: Vec<StageStatus>,
}

impl PipelineReport {
    pub fn empty(flow: Flow) -> Self {
        Self {
            flow,
            stages: Vec::new(),
        }
    }

    pub fn outcome_of(&self, name: &str) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|status| status.name == name)
            .map(|status| &status.outcome)
    }
}

/// Run every stage left to right, waiting for each before the next.
///
/// Non-zero exits are warnings. A fork failure abandons the remaining
/// stages; their descriptors are closed as the pipeline is dropped.
pub fn run(
    pipeline: Pipeline,
    elapsed: &mut ElapsedChildTime,
    out: &mut dyn Write,
) -> ShellResult<PipelineReport> {
    let mut report = PipelineReport::empty(Flow::Continue);

    for planned in pipeline.stages {
        let PlannedStage {
            stage,
            input,
            output,
        } = planned;

        if let Some(builtin) = BUILTINS.get(&stage.name) {
            drop(input);
            drop(output);
            debug!(stage = %stage.name, "builtin");

            let mut ctx = BuiltinContext {
                elapsed: &*elapsed,
                out: &mut *out,
            };
            let flow = builtin.execute(&stage.argv, &mut ctx)?;
            report.stages.push(StageStatus {
                name: stage.name,
                outcome: StageOutcome::Builtin,
            });
            if flow == Flow::Exit {
                report.flow = Flow::Exit;
                return Ok(report);
            }
            continue;
        }

        let start = Instant::now();
        let pid = commands::spawn(&stage, input, output)?;
        let waited = commands::wait(pid, &stage.name);
        elapsed.add(start.elapsed());

        let outcome = match waited {
            Ok(status) => classify(&stage.name, status),
            Err(err) => {
                emit_warning(&err);
                StageOutcome::WaitFailed
            }
        };
        report.stages.push(StageStatus {
            name: stage.name,
            outcome,
        });
    }

    Ok(report)
}

fn classify(stage: &str, status: WaitStatus) -> StageOutcome {
    match status {
        WaitStatus::Exited(_, 0) => StageOutcome::Exited(0),
        WaitStatus::Exited(_, code) => {
            emit_warning(&ProcessError::ChildNonZeroExit {
                stage: stage.to_string(),
                code,
            });
            StageOutcome::Exited(code)
        }
        WaitStatus::Signaled(_, signal, _) => {
            let signal = signal.as_str().to_string();
            emit_warning(&ProcessError::ChildSignaled {
                stage: stage.to_string(),
                signal: signal.clone(),
            });
            StageOutcome::Signaled(signal)
        }
        other => {
            debug!(stage, status = ?other, "unexpected wait status");
            StageOutcome::WaitFailed
        }
    }
}

fn emit_warning(err: &ProcessError) {
    debug!(error = %err, "stage did not succeed");
    eprintln!("Uh-oh: {}", err);
}
