use std::fs;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};

use crate::config::BoxConfig;
use crate::error::SandboxError;

/// A cgroup v2 leaf created for one boxed subprocess, delegated under the
/// caller's own `user@<uid>.service` slice (no root required, matching how
/// systemd-logind delegates cgroups to user sessions).
pub struct Cgroup {
    pub path: PathBuf,
    path_fd: RawFd,
}

impl Cgroup {
    /// `path_fd` is an `O_PATH` descriptor suitable for passing to
    /// `clone3`'s `cgroup` argument (`CLONE_INTO_CGROUP`).
    pub fn path_fd(&self) -> RawFd {
        self.path_fd
    }
}

impl Drop for Cgroup {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.path_fd);
        }
        if let Err(err) = fs::remove_dir(&self.path) {
            log::warn!("failed to remove cgroup {}: {err}", self.path.display());
        }
    }
}

pub fn setup(config: &BoxConfig) -> Result<Cgroup, SandboxError> {
    let id = uuid::Uuid::new_v4();
    let uid = unsafe { libc::getuid() };

    let user_root = Path::new("/sys/fs/cgroup")
        .join("user.slice")
        .join(format!("user-{uid}.slice"))
        .join(format!("user@{uid}.service"));
    let box_root = user_root.join(format!("box-{id}"));

    fs::create_dir(&box_root).map_err(|source| SandboxError::Cgroup {
        step: "mkdir",
        source,
    })?;

    if let Err(err) = write_limits(&box_root, config) {
        let _ = fs::remove_dir(&box_root);
        return Err(err);
    }

    let path_fd = open_path(&box_root).map_err(|source| SandboxError::Cgroup {
        step: "open O_PATH",
        source,
    })?;

    Ok(Cgroup {
        path: box_root,
        path_fd,
    })
}

fn write_limits(box_root: &Path, config: &BoxConfig) -> Result<(), SandboxError> {
    if config.tasks_limit != -1 {
        write_control(box_root, "pids.max", config.tasks_limit)?;
    }
    if config.ram_limit != -1 {
        write_control(box_root, "memory.max", config.ram_limit)?;
    }
    if config.swap_limit != -1 {
        write_control(box_root, "memory.swap.max", config.swap_limit)?;
    }
    Ok(())
}

fn write_control(box_root: &Path, file: &'static str, value: i64) -> Result<(), SandboxError> {
    fs::write(box_root.join(file), value.to_string()).map_err(|source| SandboxError::Cgroup {
        step: file,
        source,
    })
}

fn open_path(path: &Path) -> std::io::Result<RawFd> {
    use std::ffi::CString;
    let c_path = CString::new(path.as_os_str().as_encoded_bytes())
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "NUL in path"))?;
    let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_PATH) };
    if fd == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(fd)
    }
}
