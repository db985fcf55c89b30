use crate::errors::{IoError, ParseError};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;

/// Redirection operator (`<` feeds the first stage, `>` drains the last)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectionKind {
    Input,
    Output,
}

impl RedirectionKind {
    pub fn operator(self) -> char {
        match self {
            RedirectionKind::Input => '<',
            RedirectionKind::Output => '>',
        }
    }
}

/// Permission bits for output files created by `>`
pub const OUTPUT_FILE_MODE: u32 = 0o700;

fn ends_target(c: char) -> bool {
    c.is_whitespace() || c == '|'
}

/// Remove the first `op target` from `line` and return the target.
///
/// Only the first occurrence of the operator is honored; later ones stay in
/// the text and end up as ordinary arguments.
pub fn extract_redirection(
    line: &mut String,
    kind: RedirectionKind,
) -> Result<Option<String>, ParseError> {
    let operator = kind.operator();
    let Some(op_at) = line.find(operator) else {
        return Ok(None);
    };

    let after_op = op_at + operator.len_utf8();
    let rest = &line[after_op..];
    let target_start = after_op + (rest.len() - rest.trim_start().len());
    let target_len = line[target_start..]
        .find(ends_target)
        .unwrap_or(line.len() - target_start);
    let target = &line[target_start..target_start + target_len];

    if target.is_empty() || target.starts_with(['<', '>']) {
        return Err(ParseError::MissingRedirectTarget { operator });
    }

    let target = target.to_string();
    line.replace_range(op_at..target_start + target_len, " ");
    Ok(Some(target))
}

/// Open the `<` target read-only
pub fn open_input(path: &str) -> Result<File, IoError> {
    File::open(path).map_err(|source| IoError::CannotOpenInput {
        path: path.to_string(),
        source,
    })
}

/// Open the `>` target write-only, creating it with owner rwx when absent.
/// Existing content is not truncated.
pub fn open_output(path: &str) -> Result<File, IoError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .mode(OUTPUT_FILE_MODE)
        .open(path)
        .map_err(|source| IoError::CannotOpenOutput {
            path: path.to_string(),
            source,
        })
}
