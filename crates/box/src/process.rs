use std::ffi::CString;
use std::fs::File;
use std::io;
use std::os::fd::{FromRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cgroup::{self, Cgroup};
use crate::config::{BoxConfig, MountOption};
use crate::error::SandboxError;
use crate::sys::{self, clone_flags, mount_flags, umount_flags};

/// How to wire up one of a boxed subprocess' standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub enum StdioSpec {
    /// Leave the judge's own fd in place; the child inherits it.
    #[default]
    Inherit,
    /// Create a pipe; the parent gets the other end as a `File`.
    Piped,
    /// Wire the stream to `/dev/null`.
    Null,
}

/// A running (or exited) boxed subprocess.
///
/// Holds the child's pidfd for wait/poll/signal, and the cgroup leaf it was
/// cloned into, which is removed once the child has been reaped.
pub struct ChildHandle {
    pub pid: libc::pid_t,
    pidfd: Option<RawFd>,
    returncode: Option<i32>,
    cgroup: Option<Cgroup>,
    pub stdin: Option<File>,
    pub stdout: Option<File>,
    pub stderr: Option<File>,
}

/// Spawn `args[0]` (searched on `$PATH`) inside the namespaces and cgroup
/// described by `config`, rooted at `config.root`.
///
/// The calling thread is the one that gets cloned; anything else running in
/// this process at the time is absent from the child, same as `fork(2)`.
pub fn spawn(
    args: &[String],
    config: &BoxConfig,
    cwd: Option<&Path>,
    stdin: StdioSpec,
    stdout: StdioSpec,
    stderr: StdioSpec,
) -> Result<ChildHandle, SandboxError> {
    assert!(!args.is_empty(), "spawn requires at least a program name");

    let mut stdin_pipe = open_stream(stdin, Direction::Read)?;
    let mut stdout_pipe = open_stream(stdout, Direction::Write)?;
    let mut stderr_pipe = open_stream(stderr, Direction::Write)?;

    let cgroup = cgroup::setup(config)?;

    let namespace_flags = clone_flags::NEWCGROUP
        | clone_flags::NEWIPC
        | clone_flags::NEWNET
        | clone_flags::NEWNS
        | clone_flags::NEWPID
        | clone_flags::NEWUSER
        | clone_flags::NEWUTS;

    let pid = unsafe { sys::clone3(namespace_flags, Some(cgroup.path_fd())) }
        .map_err(SandboxError::Clone)?;

    if pid == 0 {
        // Child: from here on we must not unwind back into caller code or
        // touch Rust state shared with a now-absent sibling thread. Any
        // failure is reported on the inherited stderr fd and ends in
        // `_exit`, never `panic!` or `return`.
        let child_stdin = stdin_pipe.child_end();
        let child_stdout = stdout_pipe.child_end();
        let child_stderr = stderr_pipe.child_end();
        exec_child(args, config, cwd, child_stdin, child_stdout, child_stderr);
    }

    // Parent: the child now owns its own copy of each of these (dup2'd onto
    // its real stdio fd), and every fd it inherited alongside them is
    // O_CLOEXEC and closes itself at the child's `execvpe`. Our references
    // serve no further purpose; left open, they'd keep each pipe's write
    // end alive past the child's own exit, so a reader here would never
    // see EOF.
    stdin_pipe.close_child_end();
    stdout_pipe.close_child_end();
    stderr_pipe.close_child_end();

    let pidfd = sys::pidfd_open(pid).map_err(SandboxError::PidFd)?;

    Ok(ChildHandle {
        pid,
        pidfd: Some(pidfd),
        returncode: None,
        cgroup: Some(cgroup),
        stdin: stdin_pipe.into_parent_file(),
        stdout: stdout_pipe.into_parent_file(),
        stderr: stderr_pipe.into_parent_file(),
    })
}

enum Direction {
    Read,
    Write,
}

/// The two ends of a possibly-piped stream: the one the child inherits
/// verbatim, and the one the parent keeps (if any).
struct StreamPipe {
    child_fd: Option<RawFd>,
    parent_fd: Option<RawFd>,
}

impl StreamPipe {
    fn child_end(&self) -> Option<RawFd> {
        self.child_fd
    }

    /// Parent-side teardown once the child has its own copy installed:
    /// release ours so the stream's far end can actually reach EOF.
    fn close_child_end(&mut self) {
        if let Some(fd) = self.child_fd.take() {
            unsafe {
                libc::close(fd);
            }
        }
    }

    fn into_parent_file(self) -> Option<File> {
        self.parent_fd.map(|fd| unsafe { File::from_raw_fd(fd) })
    }
}

/// Every fd created here is `O_CLOEXEC`: the one `dup2`'d onto the child's
/// real stdio slot (0/1/2) loses that flag as a side effect of `dup2`, so it
/// survives into the bot, while the original descriptor — and the sibling
/// pipe end the child inherits only because `clone` copies the whole fd
/// table — both close themselves automatically at `execvpe` instead of
/// leaking into the sandboxed process.
fn open_stream(spec: StdioSpec, direction: Direction) -> io::Result<StreamPipe> {
    match spec {
        StdioSpec::Inherit => Ok(StreamPipe {
            child_fd: None,
            parent_fd: None,
        }),
        StdioSpec::Null => {
            let devnull = CString::new("/dev/null").unwrap();
            let fd = unsafe { libc::open(devnull.as_ptr(), libc::O_RDWR | libc::O_CLOEXEC) };
            if fd == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(StreamPipe {
                child_fd: Some(fd),
                parent_fd: None,
            })
        }
        StdioSpec::Piped => {
            let mut fds = [0 as RawFd; 2];
            if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } == -1 {
                return Err(io::Error::last_os_error());
            }
            let [read_fd, write_fd] = fds;
            Ok(match direction {
                Direction::Read => StreamPipe {
                    child_fd: Some(read_fd),
                    parent_fd: Some(write_fd),
                },
                Direction::Write => StreamPipe {
                    child_fd: Some(write_fd),
                    parent_fd: Some(read_fd),
                },
            })
        }
    }
}

/// Replace fd `target` with `source` if the caller asked for one, matching
/// `dup2` semantics (closes whatever `target` pointed at first).
fn install_fd(source: Option<RawFd>, target: RawFd) -> io::Result<()> {
    if let Some(fd) = source {
        if unsafe { libc::dup2(fd, target) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

fn exec_child(
    args: &[String],
    config: &BoxConfig,
    cwd: Option<&Path>,
    stdin: Option<RawFd>,
    stdout: Option<RawFd>,
    stderr: Option<RawFd>,
) -> ! {
    let result = (|| -> io::Result<()> {
        install_fd(stdin, 0)?;
        install_fd(stdout, 1)?;
        install_fd(stderr, 2)?;

        // The new root has to be a mount point in its own right before
        // pivot_root will accept it, hence the self bind mount first.
        let root_bind = crate::config::Mount::ro_bind("/", config.root.clone());
        let mounts: Vec<crate::config::Mount> = std::iter::once(root_bind)
            .chain(default_mounts(config))
            .chain(config.mounts.iter().cloned())
            .collect();
        for mount in &mounts {
            apply_mount(config, mount)?;
        }

        sys::pivot_root(&config.root, &config.root)
            .map_err(|e| io::Error::new(e.kind(), format!("pivot_root: {e}")))?;
        sys::umount(Path::new("/"), umount_flags::DETACH)
            .map_err(|e| io::Error::new(e.kind(), format!("umount old root: {e}")))?;

        if let Some(dir) = cwd {
            std::env::set_current_dir(dir)?;
        }

        exec(args)
    })();

    if let Err(err) = result {
        let message = format!("dix-box: failed to start sandboxed process: {err}\n");
        unsafe {
            libc::write(2, message.as_ptr() as *const libc::c_void, message.len());
        }
    }
    unsafe { libc::_exit(127) }
}

/// A private `/proc` and a `tmpfs` at `/tmp` so the pivoted root doesn't
/// leak the host's process table or share a writable scratch directory,
/// skipped per-destination if the operator already mounts something there.
fn default_mounts(config: &BoxConfig) -> Vec<crate::config::Mount> {
    let destinations: Vec<&Path> = config.mounts.iter().map(|m| m.destination.as_path()).collect();
    let mut defaults = Vec::new();

    if !destinations.contains(&Path::new("/proc")) {
        defaults.push(crate::config::Mount::new("/proc").fs_type("proc"));
    }
    if !destinations.contains(&Path::new("/tmp")) {
        defaults.push(crate::config::Mount::new("/tmp").fs_type("tmpfs"));
    }
    defaults
}

fn apply_mount(config: &BoxConfig, mount: &crate::config::Mount) -> io::Result<()> {
    let source = mount.source.clone().unwrap_or_else(|| PathBuf::from(&mount.r#type));
    let relative = mount
        .destination
        .strip_prefix("/")
        .unwrap_or(&mount.destination);
    let destination = config.root.join(relative);

    let mut flags: libc::c_ulong = 0;
    let mut is_bind = false;
    let mut is_ro = false;
    for option in &mount.options {
        match option {
            MountOption::Bind => {
                flags |= mount_flags::BIND;
                is_bind = true;
            }
            MountOption::RBind => {
                flags |= mount_flags::BIND | mount_flags::REC;
                is_bind = true;
            }
            MountOption::Ro => {
                flags |= mount_flags::RDONLY;
                is_ro = true;
            }
        }
    }

    sys::mount(Some(&source), &destination, &mount.r#type, flags)
        .map_err(|e| io::Error::new(e.kind(), format!("mount {}: {e}", destination.display())))?;

    // A bind mount ignores most flags on the first pass; applying `ro`
    // needs a second remount against the new mount point itself.
    if is_ro && is_bind {
        let remount_flags = flags | mount_flags::REMOUNT;
        sys::mount(None, &destination, "none", remount_flags).map_err(|e| {
            io::Error::new(e.kind(), format!("remount {}: {e}", destination.display()))
        })?;
    }

    Ok(())
}

fn exec(args: &[String]) -> io::Result<()> {
    let program = CString::new(args[0].as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "NUL in program name"))?;
    let argv: Vec<CString> = args
        .iter()
        .map(|a| CString::new(a.as_bytes()).unwrap())
        .collect();
    let argv_ptrs: Vec<*const libc::c_char> = argv
        .iter()
        .map(|a| a.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect();
    // An empty environment, matching the sandbox's intent of not leaking
    // the judge's own environment into the bot.
    let envp: [*const libc::c_char; 1] = [std::ptr::null()];

    unsafe {
        libc::execvpe(program.as_ptr(), argv_ptrs.as_ptr(), envp.as_ptr());
    }
    Err(io::Error::last_os_error())
}

const P_PIDFD: libc::idtype_t = 3;

impl ChildHandle {
    /// Non-blocking exit-status check. `None` means still running.
    pub fn poll(&mut self) -> Option<i32> {
        if self.returncode.is_some() {
            return self.returncode;
        }
        self.check_exited()
    }

    /// Block up to `timeout` (or forever, if `None`) for the child to exit,
    /// then check its status.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Option<i32> {
        if self.returncode.is_some() {
            return self.returncode;
        }
        let Some(pidfd) = self.pidfd else {
            return self.returncode;
        };

        let mut pollfd = libc::pollfd {
            fd: pidfd,
            events: libc::POLLIN,
            revents: 0,
        };
        let timeout_ms = timeout.map_or(-1, |d| d.as_millis().min(i32::MAX as u128) as i32);
        unsafe {
            libc::poll(&mut pollfd as *mut libc::pollfd, 1, timeout_ms);
        }

        self.check_exited()
    }

    fn check_exited(&mut self) -> Option<i32> {
        let Some(pidfd) = self.pidfd else {
            return self.returncode;
        };

        let mut info: libc::siginfo_t = unsafe { std::mem::zeroed() };
        let result = unsafe {
            libc::waitid(
                P_PIDFD,
                pidfd as libc::id_t,
                &mut info as *mut libc::siginfo_t,
                libc::WEXITED | libc::WNOHANG,
            )
        };
        if result != 0 {
            return None;
        }
        if info.si_signo == 0 {
            return None;
        }

        let code = if info.si_code == libc::CLD_EXITED {
            unsafe { info.si_status() }
        } else {
            unsafe { -info.si_status() }
        };
        self.returncode = Some(code);
        self.cleanup();
        self.returncode
    }

    /// Release order matches the sandbox's construction order in reverse:
    /// the pidfd closes before the cgroup directory is removed, since the
    /// kernel won't let `rmdir` succeed while anything still references
    /// the now-reaped child through it.
    fn cleanup(&mut self) {
        if let Some(pidfd) = self.pidfd.take() {
            unsafe {
                libc::close(pidfd);
            }
        }
        self.cgroup = None;
    }

    /// Send a signal directly to the boxed process via its pidfd, avoiding
    /// the pid-reuse race a plain `kill(2)` call would have.
    pub fn send_signal(&self, signal: libc::c_int) -> io::Result<()> {
        match self.pidfd {
            Some(pidfd) => sys::pidfd_send_signal(pidfd, signal),
            None => Ok(()),
        }
    }

    pub fn terminate(&self) -> io::Result<()> {
        self.send_signal(libc::SIGTERM)
    }

    pub fn kill(&self) -> io::Result<()> {
        self.send_signal(libc::SIGKILL)
    }

    /// Close the streams we own and wait for the child to exit.
    pub fn close(&mut self) {
        self.stdin = None;
        self.stdout = None;
        self.stderr = None;
        self.wait(None);
    }
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        if let Some(pidfd) = self.pidfd {
            unsafe {
                libc::close(pidfd);
            }
        }
    }
}
