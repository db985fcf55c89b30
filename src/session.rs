use crate::commands::Flow;
use crate::errors::ShellResult;
use crate::history::{HistoryLog, Recall};
use crate::parser::parse_line;
use crate::pipeline;
use crate::supervisor::{self, PipelineReport};
use crate::timing::ElapsedChildTime;
use std::io::{self, Write};
use tracing::debug;

/// Everything that lives for one interpreter run
#[derive(Debug, Default)]
pub struct Session {
    history: HistoryLog,
    elapsed: ElapsedChildTime,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn elapsed(&self) -> ElapsedChildTime {
        self.elapsed
    }

    /// Run one submitted line, reporting to stdout
    pub fn execute_line(&mut self, raw: &str) -> ShellResult<PipelineReport> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.execute_line_to(raw, &mut out)
    }

    /// Run one submitted line: recall, record, parse, build, supervise.
    ///
    /// A failed recall leaves the history untouched. Any other line that
    /// is not blank is recorded before it is parsed.
    pub fn execute_line_to(
        &mut self,
        raw: &str,
        out: &mut dyn Write,
    ) -> ShellResult<PipelineReport> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(PipelineReport::empty(Flow::Continue));
        }

        let recall = self.history.resolve(trimmed)?;
        if let Recall::BackReference { steps, line } = &recall {
            writeln!(out, "Executing command {} steps back: '{}'", steps, line)?;
        }
        let line = recall.into_line();
        self.history.push(line.as_str());

        if line == "exit" {
            return Ok(PipelineReport::empty(Flow::Exit));
        }

        let parsed = parse_line(&line)?;
        let pipeline = pipeline::build(parsed)?;
        debug!(%line, stages = pipeline.stages.len(), "running pipeline");
        out.flush()?;
        supervisor::run(pipeline, &mut self.elapsed, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{HistoryError, ParseError, ShellError};

    fn submit(session: &mut Session, line: &str) -> ShellResult<PipelineReport> {
        let mut out = Vec::new();
        session.execute_line_to(line, &mut out)
    }

    #[test]
    fn blank_lines_are_not_recorded() {
        let mut session = Session::new();
        let report = submit(&mut session, "   ").unwrap();
        assert_eq!(report.flow, Flow::Continue);
        assert!(session.history().is_empty());
    }

    #[test]
    fn exit_line_ends_session() {
        let mut session = Session::new();
        let report = submit(&mut session, "exit").unwrap();
        assert_eq!(report.flow, Flow::Exit);
        assert_eq!(session.history().entries(), ["exit"]);
    }

    #[test]
    fn failed_recall_is_not_recorded() {
        let mut session = Session::new();
        let err = submit(&mut session, "^0").unwrap_err();
        assert!(matches!(
            err,
            ShellError::History(HistoryError::OutOfRange { .. })
        ));
        assert!(session.history().is_empty());
    }

    #[test]
    fn malformed_lines_are_still_recorded() {
        let mut session = Session::new();
        let err = submit(&mut session, "ls | | wc").unwrap_err();
        assert!(matches!(
            err,
            ShellError::Parse(ParseError::EmptyStage { index: 1 })
        ));
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn recall_announces_the_resolved_line() {
        let mut session = Session::new();
        submit(&mut session, "true").unwrap();

        let mut out = Vec::new();
        session.execute_line_to("^0", &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Executing command 0 steps back: 'true'\n"
        );
        assert_eq!(session.history().entries(), ["true", "true"]);
    }
}
