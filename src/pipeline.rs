use crate::errors::IoError;
use crate::parser::{ParsedLine, Stage};
use crate::redirection::{open_input, open_output};
use nix::fcntl::OFlag;
use nix::unistd::pipe2;
use std::fs::File;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use tracing::debug;

/// Where a stage reads from or writes to
#[derive(Debug)]
pub enum Descriptor {
    /// The interpreter's own stdin/stdout
    Inherited,
    Channel(OwnedFd),
    File(File),
}

impl Descriptor {
    /// The descriptor to remap onto the standard slot, if any
    pub fn redirect_fd(&self) -> Option<BorrowedFd<'_>> {
        match self {
            Descriptor::Inherited => None,
            Descriptor::Channel(fd) => Some(fd.as_fd()),
            Descriptor::File(file) => Some(file.as_fd()),
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self, Descriptor::Inherited)
    }
}

/// A pipe between two consecutive stages
#[derive(Debug)]
pub struct Channel {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Channel {
    /// Both ends are close-on-exec; a child only keeps what it remaps
    pub fn open(producer: &str) -> Result<Self, IoError> {
        let (read, write) =
            pipe2(OFlag::O_CLOEXEC).map_err(|source| IoError::PipeCreationFailed {
                stage: producer.to_string(),
                source,
            })?;
        Ok(Self { read, write })
    }
}

/// A stage with its input and output resolved
#[derive(Debug)]
pub struct PlannedStage {
    pub stage: Stage,
    pub input: Descriptor,
    pub output: Descriptor,
}

/// Stages ready to spawn, in order
#[derive(Debug)]
pub struct Pipeline {
    pub stages: Vec<PlannedStage>,
    channel_count: usize,
}

impl Pipeline {
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }
}

/// Allocate every channel and open the redirect files before anything runs.
///
/// Any failure drops what was already opened, so nothing leaks into the
/// next attempt.
pub fn build(parsed: ParsedLine) -> Result<Pipeline, IoError> {
    let ParsedLine {
        stages,
        input,
        output,
    } = parsed;

    let channels = stages
        .iter()
        .take(stages.len().saturating_sub(1))
        .map(|stage| Channel::open(&stage.name))
        .collect::<Result<Vec<_>, _>>()?;
    let channel_count = channels.len();

    let mut first_input = match input {
        Some(path) => Descriptor::File(open_input(&path)?),
        None => Descriptor::Inherited,
    };
    let mut last_output = match output {
        Some(path) => Descriptor::File(open_output(&path)?),
        None => Descriptor::Inherited,
    };

    debug!(stages = stages.len(), channels = channel_count, "pipeline allocated");

    let (reads, writes): (Vec<_>, Vec<_>) = channels
        .into_iter()
        .map(|channel| (channel.read, channel.write))
        .unzip();
    let mut reads = reads.into_iter();
    let mut writes = writes.into_iter();

    let last = stages.len().saturating_sub(1);
    let planned = stages
        .into_iter()
        .enumerate()
        .map(|(i, stage)| {
            let input = if i == 0 {
                std::mem::replace(&mut first_input, Descriptor::Inherited)
            } else {
                reads.next().map_or(Descriptor::Inherited, Descriptor::Channel)
            };
            let output = if i < last {
                writes.next().map_or(Descriptor::Inherited, Descriptor::Channel)
            } else {
                std::mem::replace(&mut last_output, Descriptor::Inherited)
            };
            PlannedStage {
                stage,
                input,
                output,
            }
        })
        .collect();

    Ok(Pipeline {
        stages: planned,
        channel_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;
    use std::io::{Read, Write};

    fn plan(line: &str) -> Result<Pipeline, IoError> {
        build(parse_line(line).unwrap())
    }

    #[test]
    fn single_stage_inherits_both_ends() {
        let pipeline = plan("ls -l").unwrap();
        assert_eq!(pipeline.stages.len(), 1);
        assert_eq!(pipeline.channel_count(), 0);
        assert!(pipeline.stages[0].input.is_inherited());
        assert!(pipeline.stages[0].output.is_inherited());
    }

    #[test]
    fn three_stages_get_two_channels() {
        let pipeline = plan("a|b|c").unwrap();
        assert_eq!(pipeline.channel_count(), 2);

        let [first, middle, last] = &pipeline.stages[..] else {
            panic!("expected three stages");
        };
        assert!(first.input.is_inherited());
        assert!(matches!(first.output, Descriptor::Channel(_)));
        assert!(matches!(middle.input, Descriptor::Channel(_)));
        assert!(matches!(middle.output, Descriptor::Channel(_)));
        assert!(matches!(last.input, Descriptor::Channel(_)));
        assert!(last.output.is_inherited());
    }

    #[test]
    fn channel_connects_neighbours() {
        let mut pipeline = plan("a | b").unwrap();
        let consumer = pipeline.stages.pop().unwrap();
        let producer = pipeline.stages.pop().unwrap();

        let Descriptor::Channel(write) = producer.output else {
            panic!("producer should write to a channel");
        };
        let Descriptor::Channel(read) = consumer.input else {
            panic!("consumer should read from a channel");
        };

        File::from(write).write_all(b"ping").unwrap();
        let mut received = String::new();
        File::from(read).read_to_string(&mut received).unwrap();
        assert_eq!(received, "ping");
    }

    #[test]
    fn redirects_bind_to_pipeline_ends() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.txt");
        std::fs::write(&input, "x\n").unwrap();

        let line = format!(
            "cat < {} | sort | uniq > {}",
            input.display(),
            output.display()
        );
        let pipeline = plan(&line).unwrap();
        assert!(matches!(pipeline.stages[0].input, Descriptor::File(_)));
        assert!(matches!(pipeline.stages[2].output, Descriptor::File(_)));
        assert!(output.exists());
    }

    #[test]
    fn missing_input_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let line = format!("cat < {}", dir.path().join("absent").display());
        assert!(matches!(
            plan(&line),
            Err(IoError::CannotOpenInput { .. })
        ));
    }

    #[test]
    fn unwritable_output_aborts_build() {
        let dir = tempfile::tempdir().unwrap();
        let line = format!("echo hi > {}", dir.path().join("no/such/dir").display());
        assert!(matches!(
            plan(&line),
            Err(IoError::CannotOpenOutput { .. })
        ));
    }
}
