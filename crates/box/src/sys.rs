//! Raw Linux syscalls that glibc doesn't expose a safe wrapper for, or that
//! `libc` only added wrappers for in glibc versions newer than we want to
//! depend on. Syscall numbers below are x86_64-specific; porting this crate
//! to another architecture means updating this table.
use std::ffi::CString;
use std::io;
use std::os::fd::RawFd;
use std::path::Path;

#[cfg(target_arch = "x86_64")]
mod nr {
    pub const PIVOT_ROOT: libc::c_long = 155;
    pub const CLONE3: libc::c_long = 435;
    pub const PIDFD_OPEN: libc::c_long = 434;
    pub const PIDFD_SEND_SIGNAL: libc::c_long = 424;
}

/// clone(2) flags, from `linux/sched.h`. Only the namespace flags Dix boxes
/// actually use are named; this is not an exhaustive CLONE_* mirror.
pub mod clone_flags {
    pub const NEWNS: u64 = 0x0002_0000;
    pub const NEWCGROUP: u64 = 0x0200_0000;
    pub const NEWUTS: u64 = 0x0400_0000;
    pub const NEWIPC: u64 = 0x0800_0000;
    pub const NEWUSER: u64 = 0x1000_0000;
    pub const NEWPID: u64 = 0x2000_0000;
    pub const NEWNET: u64 = 0x4000_0000;
    pub const INTO_CGROUP: u64 = 0x2_0000_0000;
}

/// mount(2) flags, from `linux/mount.h`.
pub mod mount_flags {
    pub const RDONLY: libc::c_ulong = 1;
    pub const REMOUNT: libc::c_ulong = 32;
    pub const BIND: libc::c_ulong = 4096;
    pub const REC: libc::c_ulong = 16384;
}

/// umount2(2) flags, from `linux/fs.h`.
pub mod umount_flags {
    pub const DETACH: libc::c_int = 0x0000_0002;
}

#[repr(C)]
struct CloneArgs {
    flags: u64,
    pidfd: u64,
    child_tid: u64,
    parent_tid: u64,
    exit_signal: u64,
    stack: u64,
    stack_size: u64,
    tls: u64,
    set_tid: u64,
    set_tid_size: u64,
    cgroup: u64,
}

fn errno_result(result: libc::c_long) -> io::Result<libc::c_long> {
    if result == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(result)
    }
}

/// Clone a new process into the given namespaces, optionally placing it
/// directly into the cgroup opened at `cgroup_fd` (an `O_PATH` descriptor).
/// Returns the child's pid in the parent and `0` in the child, same calling
/// convention as `fork`.
///
/// # Safety
/// Must be called with no other threads racing to fork; the child side of
/// the return must not touch any Rust state assuming a multi-threaded
/// runtime (no allocator locks, no tokio reactor) until it execs.
pub unsafe fn clone3(namespace_flags: u64, cgroup_fd: Option<RawFd>) -> io::Result<libc::pid_t> {
    let mut flags = namespace_flags;
    let cgroup = if let Some(fd) = cgroup_fd {
        flags |= clone_flags::INTO_CGROUP;
        fd as u64
    } else {
        0
    };

    let mut args = CloneArgs {
        flags,
        pidfd: 0,
        child_tid: 0,
        parent_tid: 0,
        exit_signal: libc::SIGCHLD as u64,
        stack: 0,
        stack_size: 0,
        tls: 0,
        set_tid: 0,
        set_tid_size: 0,
        cgroup,
    };

    let result = libc::syscall(
        nr::CLONE3,
        &mut args as *mut CloneArgs,
        std::mem::size_of::<CloneArgs>(),
    );
    errno_result(result).map(|pid| pid as libc::pid_t)
}

/// Open a pidfd for an existing process, per `pidfd_open(2)`.
pub fn pidfd_open(pid: libc::pid_t) -> io::Result<RawFd> {
    let result = unsafe { libc::syscall(nr::PIDFD_OPEN, pid, 0) };
    errno_result(result).map(|fd| fd as RawFd)
}

/// Send a signal to the process referenced by a pidfd, per
/// `pidfd_send_signal(2)`.
pub fn pidfd_send_signal(pidfd: RawFd, signal: libc::c_int) -> io::Result<()> {
    let result =
        unsafe { libc::syscall(nr::PIDFD_SEND_SIGNAL, pidfd, signal, std::ptr::null::<u8>(), 0) };
    errno_result(result).map(|_| ())
}

fn path_to_cstring(path: &Path) -> io::Result<CString> {
    CString::new(path.as_os_str().as_encoded_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains a NUL byte"))
}

/// mount(2), with `source` and `fstype` optional the way the kernel accepts
/// `NULL` for a bind remount.
pub fn mount(
    source: Option<&Path>,
    target: &Path,
    fstype: &str,
    flags: libc::c_ulong,
) -> io::Result<()> {
    let source_c = source.map(path_to_cstring).transpose()?;
    let target_c = path_to_cstring(target)?;
    let fstype_c = CString::new(fstype)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "fstype contains a NUL byte"))?;

    let result = unsafe {
        libc::mount(
            source_c.as_ref().map_or(std::ptr::null(), |c| c.as_ptr()),
            target_c.as_ptr(),
            fstype_c.as_ptr(),
            flags,
            std::ptr::null(),
        )
    };
    errno_result(result as libc::c_long).map(|_| ())
}

/// umount2(2).
pub fn umount(target: &Path, flags: libc::c_int) -> io::Result<()> {
    let target_c = path_to_cstring(target)?;
    let result = unsafe { libc::umount2(target_c.as_ptr(), flags) };
    errno_result(result as libc::c_long).map(|_| ())
}

/// pivot_root(2). Neither glibc nor `libc` wraps this call.
pub fn pivot_root(new_root: &Path, put_old: &Path) -> io::Result<()> {
    let new_root_c = path_to_cstring(new_root)?;
    let put_old_c = path_to_cstring(put_old)?;
    let result = unsafe { libc::syscall(nr::PIVOT_ROOT, new_root_c.as_ptr(), put_old_c.as_ptr()) };
    errno_result(result).map(|_| ())
}
