use crate::errors::{IoError, ProcessError, StdSlot};
use crate::parser::Stage;
use crate::pipeline::Descriptor;
use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::libc;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, write, ForkResult, Pid};
use std::ffi::CString;
use std::os::fd::{AsFd, AsRawFd, RawFd};
use tracing::debug;

/// Exit status of a child whose program could not be executed
pub const EXEC_FAILURE_STATUS: i32 = 1;

/// Exit status of a child whose stdin/stdout could not be remapped
pub const REMAP_FAILURE_STATUS: i32 = 2;

struct Remap {
    fd: RawFd,
    slot: RawFd,
    failure: String,
}

/// Everything the child needs, prepared before the fork so the child
/// itself only makes system calls.
struct ChildPlan {
    program: CString,
    argv: Vec<CString>,
    remaps: Vec<Remap>,
    exec_failure: String,
}

impl ChildPlan {
    fn prepare(
        stage: &Stage,
        input: &Descriptor,
        output: &Descriptor,
    ) -> Result<Self, ProcessError> {
        let invalid = |_: std::ffi::NulError| ProcessError::InvalidArgument {
            stage: stage.name.clone(),
        };
        let program = CString::new(stage.name.as_str()).map_err(invalid)?;
        let argv = stage
            .argv
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        let remaps = [
            (input, libc::STDIN_FILENO, StdSlot::Input),
            (output, libc::STDOUT_FILENO, StdSlot::Output),
        ]
        .into_iter()
        .filter_map(|(descriptor, slot, kind)| {
            descriptor.redirect_fd().map(|fd| Remap {
                fd: fd.as_raw_fd(),
                slot,
                failure: child_message(&IoError::DescriptorRemapFailed {
                    stage: stage.name.clone(),
                    slot: kind,
                }),
            })
        })
        .collect();

        Ok(Self {
            program,
            argv,
            remaps,
            exec_failure: child_message(&ProcessError::ExecFailed {
                stage: stage.name.clone(),
            }),
        })
    }

    /// The child's whole life after fork. Never returns into the interpreter.
    fn run(self) -> ! {
        for remap in &self.remaps {
            if let Err(errno) = remap_onto(remap.fd, remap.slot) {
                report(&remap.failure, errno);
                terminate(REMAP_FAILURE_STATUS);
            }
        }

        let errno = match execvp(&self.program, &self.argv) {
            Ok(never) => match never {},
            Err(errno) => errno,
        };
        report(&self.exec_failure, errno);
        terminate(EXEC_FAILURE_STATUS)
    }
}

/// Leave the child without running atexit handlers or flushing buffers
/// inherited from the interpreter.
fn terminate(status: i32) -> ! {
    // SAFETY: _exit only ends the calling process.
    unsafe { libc::_exit(status) }
}

fn child_message(err: &dyn std::error::Error) -> String {
    format!("pipeshell: {}", err)
}

/// Descriptors are close-on-exec; dup2 clears that on the copy, but a
/// descriptor already sitting in its slot has to be cleared by hand.
fn remap_onto(fd: RawFd, slot: RawFd) -> Result<(), Errno> {
    if fd == slot {
        fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
    } else {
        dup2(fd, slot)?;
    }
    Ok(())
}

fn report(message: &str, errno: Errno) {
    let stderr = std::io::stderr();
    for part in [message, ": ", errno.desc(), "\n"] {
        let _ = write(stderr.as_fd(), part.as_bytes());
    }
}

/// Fork one child running `stage`, wired to `input` and `output`.
///
/// The parent's copies of both descriptors are closed as soon as the fork
/// returns.
pub fn spawn(stage: &Stage, input: Descriptor, output: Descriptor) -> Result<Pid, ProcessError> {
    let plan = ChildPlan::prepare(stage, &input, &output)?;
    let child = fork_child(plan, &stage.name)?;
    drop(input);
    drop(output);
    debug!(stage = %stage.name, pid = child.as_raw(), "spawned");
    Ok(child)
}

fn fork_child(plan: ChildPlan, stage: &str) -> Result<Pid, ProcessError> {
    // SAFETY: the child only remaps descriptors, execs and exits, using
    // data prepared before the fork.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => plan.run(),
        Ok(ForkResult::Parent { child }) => Ok(child),
        Err(source) => Err(ProcessError::ForkFailed {
            stage: stage.to_string(),
            source,
        }),
    }
}

/// Block until `pid` terminates
pub fn wait(pid: Pid, stage: &str) -> Result<WaitStatus, ProcessError> {
    loop {
        match waitpid(pid, None) {
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ProcessError::WaitFailed {
                    stage: stage.to_string(),
                    source,
                })
            }
            Ok(status) => {
                debug!(stage, ?status, "reaped");
                return Ok(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::os::fd::FromRawFd;

    fn stage(argv: &[&str]) -> Stage {
        Stage {
            name: argv[0].to_string(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn run(argv: &[&str]) -> WaitStatus {
        let stage = stage(argv);
        let pid = spawn(&stage, Descriptor::Inherited, Descriptor::Inherited).unwrap();
        wait(pid, &stage.name).unwrap()
    }

    #[test]
    fn reports_exit_codes() {
        assert!(matches!(run(&["true"]), WaitStatus::Exited(_, 0)));
        assert!(matches!(run(&["false"]), WaitStatus::Exited(_, 1)));
    }

    #[test]
    fn unknown_program_exits_with_one() {
        assert!(matches!(
            run(&["pipeshell-no-such-program"]),
            WaitStatus::Exited(_, EXEC_FAILURE_STATUS)
        ));
    }

    #[test]
    fn nul_in_argument_is_rejected_before_fork() {
        let stage = stage(&["echo", "a\0b"]);
        let err = spawn(&stage, Descriptor::Inherited, Descriptor::Inherited).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidArgument { .. }));
    }

    #[test]
    fn failed_remap_exits_before_exec() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let stage = stage(&["touch", marker.to_str().unwrap()]);

        // park a descriptor far above anything else the tests open, plan
        // around it, then close it so the child finds nothing there
        let source = File::open("/dev/null").unwrap();
        let parked = dup2(source.as_raw_fd(), 987).unwrap();
        let input = Descriptor::File(unsafe { File::from_raw_fd(parked) });
        let plan = ChildPlan::prepare(&stage, &input, &Descriptor::Inherited).unwrap();
        drop(input);

        let pid = fork_child(plan, &stage.name).unwrap();
        assert!(matches!(
            wait(pid, &stage.name).unwrap(),
            WaitStatus::Exited(_, REMAP_FAILURE_STATUS)
        ));
        assert!(!marker.exists());
    }

    #[test]
    fn remap_failure_message_names_stage_and_slot() {
        let message = child_message(&IoError::DescriptorRemapFailed {
            stage: "cat".to_string(),
            slot: StdSlot::Output,
        });
        assert_eq!(message, "pipeshell: Error redirecting output to 'cat'");
    }
}
