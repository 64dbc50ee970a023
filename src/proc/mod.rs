pub(crate) mod live;

#[cfg(test)]
pub(crate) mod fake;

use std::io;

use nix::errno::Errno;

pub use live::LiveRegistry;

/// Abstraction over the system process registry.
///
/// The live registry reads `/proc`; tests supply scripted registries so the
/// census and wait logic can be driven deterministically.
pub trait ProcRegistry {
    /// Process IDs currently listed in the registry, in ascending order.
    /// Entries that are not process IDs are skipped.
    fn list_pids(&self) -> Result<Vec<u64>, Error>;

    /// Target of `/proc/[pid]/ns/user`.
    fn user_ns(&self, pid: u64) -> Result<String, Error>;

    /// Target of `/proc/self/ns/user`.
    fn self_user_ns(&self) -> Result<String, Error>;
}

impl<R: ProcRegistry + ?Sized> ProcRegistry for &R {
    fn list_pids(&self) -> Result<Vec<u64>, Error> {
        (**self).list_pids()
    }

    fn user_ns(&self, pid: u64) -> Result<String, Error> {
        (**self).user_ns(pid)
    }

    fn self_user_ns(&self) -> Result<String, Error> {
        (**self).self_user_ns()
    }
}

/// Parse a registry entry name as a process ID.
///
/// Only plain decimal digits are accepted, so names like `self`, `+1` or
/// `0` are rejected.
pub fn parse_pid(name: &str) -> Option<u64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match name.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(pid) => Some(pid),
    }
}

/// Unified error type for exec-wait operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The registry directory itself could not be listed.
    #[error("cannot list {root}: {source}")]
    Registry {
        root: String,
        #[source]
        source: io::Error,
    },
    /// A user namespace link could not be read.
    #[error("cannot read user namespace of {entry}: {source}")]
    Namespace {
        entry: String,
        #[source]
        source: io::Error,
    },
    /// The process is still listed but has no user namespace link, as on
    /// kernels built without user namespaces.
    #[error("no user namespace link at {entry}")]
    MissingLink { entry: String },
    /// An invalid configuration value.
    #[error("invalid {var} '{value}': {reason}")]
    Config {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Error {
    pub fn config(var: &'static str, value: &str, reason: &str) -> Self {
        Error::Config {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error means the process exited while we were looking at
    /// it, as opposed to the entry being present but unreadable.
    pub fn is_vanished(&self) -> bool {
        match self {
            Error::Namespace { source, .. } => is_vanished_io(source),
            _ => false,
        }
    }
}

fn is_vanished_io(e: &io::Error) -> bool {
    match e.raw_os_error().map(Errno::from_raw) {
        Some(Errno::ENOENT) | Some(Errno::ESRCH) => true,
        Some(_) => false,
        None => e.kind() == io::ErrorKind::NotFound,
    }
}
