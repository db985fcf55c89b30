use nix::errno::Errno;
use std::fmt;
use std::io;
use thiserror::Error;

/// Standard slot a stage descriptor is remapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdSlot {
    Input,
    Output,
}

impl fmt::Display for StdSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdSlot::Input => f.write_str("input"),
            StdSlot::Output => f.write_str("output"),
        }
    }
}

/// Errors raised while splitting a line into stages
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected a file name after '{operator}'")]
    MissingRedirectTarget { operator: char },

    #[error("empty command in pipeline position {index}")]
    EmptyStage { index: usize },
}

/// Errors raised while wiring stage input and output
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Error reading '{path}': {source}")]
    CannotOpenInput { path: String, source: io::Error },

    #[error("Error writing to '{path}': {source}")]
    CannotOpenOutput { path: String, source: io::Error },

    #[error("could not create pipe for '{stage}': {source}")]
    PipeCreationFailed { stage: String, source: Errno },

    #[error("Error redirecting {slot} to '{stage}'")]
    DescriptorRemapFailed { stage: String, slot: StdSlot },
}

/// Errors raised while running stage processes
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not fork '{stage}': {source}")]
    ForkFailed { stage: String, source: Errno },

    #[error("child process returned with value {code} while trying to execute '{stage}'")]
    ChildNonZeroExit { stage: String, code: i32 },

    #[error("child process '{stage}' was killed by {signal}")]
    ChildSignaled { stage: String, signal: String },

    #[error("error waiting for '{stage}': {source}")]
    WaitFailed { stage: String, source: Errno },

    #[error("argument of '{stage}' contains a NUL byte")]
    InvalidArgument { stage: String },

    #[error("cannot execute '{stage}'")]
    ExecFailed { stage: String },
}

/// Errors raised while resolving `^N` back-references
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error(
        "Command requested was farther back than history allows ({})",
        range_hint(.available)
    )]
    OutOfRange { requested: String, available: usize },
}

fn range_hint(available: &usize) -> String {
    match *available {
        0 => "history is empty".to_string(),
        n => format!("farthest step back is {}", n - 1),
    }
}

/// Comprehensive error type for shell operations
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("IO error: {0}")]
    Output(#[from] io::Error),

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Interrupted")]
    Interrupted,
}

pub type ShellResult<T> = Result<T, ShellError>;
