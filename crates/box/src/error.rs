use std::fmt;
use std::io;

/// Something went wrong constructing or tearing down a sandbox.
///
/// Wraps the raw `io::Error` from whichever syscall failed, tagged with
/// enough context to point at the failing step without needing to unwind
/// a backtrace.
#[derive(Debug)]
pub enum SandboxError {
    Cgroup { step: &'static str, source: io::Error },
    Mount { mount: String, source: io::Error },
    Clone(io::Error),
    PivotRoot(io::Error),
    PidFd(io::Error),
    Io(io::Error),
}

impl fmt::Display for SandboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxError::Cgroup { step, source } => {
                write!(f, "cgroup setup failed at '{step}': {source}")
            }
            SandboxError::Mount { mount, source } => {
                write!(f, "failed to mount {mount}: {source}")
            }
            SandboxError::Clone(source) => write!(f, "clone3 failed: {source}"),
            SandboxError::PivotRoot(source) => write!(f, "pivot_root failed: {source}"),
            SandboxError::PidFd(source) => write!(f, "pidfd_open failed: {source}"),
            SandboxError::Io(source) => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for SandboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SandboxError::Cgroup { source, .. } => Some(source),
            SandboxError::Mount { source, .. } => Some(source),
            SandboxError::Clone(source) => Some(source),
            SandboxError::PivotRoot(source) => Some(source),
            SandboxError::PidFd(source) => Some(source),
            SandboxError::Io(source) => Some(source),
        }
    }
}

impl From<io::Error> for SandboxError {
    fn from(source: io::Error) -> Self {
        SandboxError::Io(source)
    }
}
