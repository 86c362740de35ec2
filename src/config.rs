use std::path::{Path, PathBuf};

pub const MODULE_EXTENSION: &str = "pmo";
pub const DEFAULT_MAX_CALL_DEPTH: usize = 512;

/// Where modules are looked up and how deep invocations may nest.
#[derive(Debug, Clone)]
pub struct Config {
    pub stdlib_dir: PathBuf,
    pub userlib_dir: PathBuf,
    pub max_call_depth: usize,
}

impl Config {
    /// The bundled standard library plus a `userlib` directory beside the
    /// entry program.
    pub fn for_program(program: &Path) -> Self {
        let base = program
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self {
            stdlib_dir: bundled_stdlib_dir(),
            userlib_dir: base.join("userlib"),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn with_stdlib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stdlib_dir = dir.into();
        self
    }

    pub fn with_userlib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.userlib_dir = dir.into();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stdlib_dir: bundled_stdlib_dir(),
            userlib_dir: PathBuf::from("userlib"),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// `stdlib/` next to the running executable when it is installed with one,
/// otherwise the `stdlib/` of the source checkout the crate was built from.
pub fn bundled_stdlib_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("stdlib")))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("stdlib"))
}
