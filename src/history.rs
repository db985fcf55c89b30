use crate::errors::HistoryError;
use once_cell::sync::Lazy;
use regex::Regex;

/// `^N` at the start of a line, followed by whitespace or the end
static BACK_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\^([0-9]+)(?:\s|$)").expect("back-reference pattern is valid"));

/// Result of resolving one submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recall {
    /// The line was not a back-reference
    Literal(String),
    /// `^steps` resolved to an earlier line
    BackReference { steps: usize, line: String },
}

impl Recall {
    pub fn into_line(self) -> String {
        match self {
            Recall::Literal(line) => line,
            Recall::BackReference { line, .. } => line,
        }
    }
}

/// Session history of resolved lines, oldest first.
///
/// `^0` names the line submitted just before the current one. The current
/// submission is not in the log while it is being resolved, and only
/// resolved text is ever stored, so chained recalls see plain commands.
#[derive(Debug, Default, Clone)]
pub struct HistoryLog {
    entries: Vec<String>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Add a resolved line
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
    }

    /// Resolve `line` against the log without modifying it
    pub fn resolve(&self, line: &str) -> Result<Recall, HistoryError> {
        let Some(digits) = back_reference(line) else {
            return Ok(Recall::Literal(line.to_string()));
        };

        let available = self.entries.len();
        let out_of_range = || HistoryError::OutOfRange {
            requested: digits.to_string(),
            available,
        };

        let steps: usize = digits.parse().map_err(|_| out_of_range())?;
        if steps >= available {
            return Err(out_of_range());
        }

        Ok(Recall::BackReference {
            steps,
            line: self.entries[available - 1 - steps].clone(),
        })
    }
}

/// The digits of a `^N` back-reference, if `line` is one
pub fn back_reference(line: &str) -> Option<&str> {
    BACK_REFERENCE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
