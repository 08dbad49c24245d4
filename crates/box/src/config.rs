use std::path::PathBuf;

/// A single mount to perform inside the sandbox, before `pivot_root`.
///
/// Mirrors the `bind`/`rbind`/`ro` vocabulary of a typical container
/// runtime's mount spec rather than exposing raw `MS_*` flags.
#[derive(Debug, Clone)]
pub struct Mount {
    pub destination: PathBuf,
    pub source: Option<PathBuf>,
    pub r#type: String,
    pub options: Vec<MountOption>,
}

impl Mount {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Mount {
            destination: destination.into(),
            source: None,
            r#type: "none".to_string(),
            options: Vec::new(),
        }
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn fs_type(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = r#type.into();
        self
    }

    pub fn option(mut self, option: MountOption) -> Self {
        self.options.push(option);
        self
    }

    /// A read-only recursive bind mount, the shape used for the bot root
    /// itself and for any directory handed in by the operator.
    pub fn ro_bind(destination: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        Mount::new(destination)
            .source(source)
            .option(MountOption::RBind)
            .option(MountOption::Ro)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOption {
    Bind,
    RBind,
    Ro,
}

/// Sandbox isolation settings for a single boxed subprocess.
///
/// `tasks_limit`, `ram_limit`, and `swap_limit` of `-1` mean "no limit" and
/// skip writing the corresponding cgroup control file, matching cgroup v2's
/// own "max" default.
#[derive(Debug, Clone)]
pub struct BoxConfig {
    pub root: PathBuf,
    pub mounts: Vec<Mount>,
    pub tasks_limit: i64,
    pub ram_limit: i64,
    pub swap_limit: i64,
}

impl Default for BoxConfig {
    fn default() -> Self {
        BoxConfig {
            root: PathBuf::new(),
            mounts: Vec::new(),
            tasks_limit: -1,
            ram_limit: -1,
            swap_limit: -1,
        }
    }
}

impl BoxConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        BoxConfig {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mounts.push(mount);
        self
    }

    pub fn with_tasks_limit(mut self, limit: i64) -> Self {
        self.tasks_limit = limit;
        self
    }

    pub fn with_ram_limit(mut self, limit: i64) -> Self {
        self.ram_limit = limit;
        self
    }

    pub fn with_swap_limit(mut self, limit: i64) -> Self {
        self.swap_limit = limit;
        self
    }
}
