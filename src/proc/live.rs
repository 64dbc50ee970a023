use std::fs;
use std::path::{Path, PathBuf};

use super::{parse_pid, Error, ProcRegistry};

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Live registry backend: reads everything from a procfs mount.
pub struct LiveRegistry {
    root: PathBuf,
}

impl LiveRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LiveRegistry { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_user_ns(&self, entry: &str) -> Result<String, Error> {
        let link = self.root.join(entry).join("ns").join("user");
        let err = match fs::read_link(&link) {
            Ok(target) => return Ok(target.to_string_lossy().into_owned()),
            Err(source) => Error::Namespace {
                entry: link.display().to_string(),
                source,
            },
        };
        // A missing link only means the process exited if its directory is
        // gone too.
        if err.is_vanished() && self.root.join(entry).is_dir() {
            return Err(Error::MissingLink {
                entry: link.display().to_string(),
            });
        }
        Err(err)
    }
}

impl Default for LiveRegistry {
    fn default() -> Self {
        LiveRegistry::new(DEFAULT_PROC_ROOT)
    }
}

impl ProcRegistry for LiveRegistry {
    fn list_pids(&self) -> Result<Vec<u64>, Error> {
        let entries = fs::read_dir(&self.root).map_err(|source| Error::Registry {
            root: self.root.display().to_string(),
            source,
        })?;
        let mut pids: Vec<u64> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| parse_pid(e.file_name().to_str()?))
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn user_ns(&self, pid: u64) -> Result<String, Error> {
        self.read_user_ns(&pid.to_string())
    }

    fn self_user_ns(&self) -> Result<String, Error> {
        self.read_user_ns("self")
    }
}
