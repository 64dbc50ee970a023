use std::cell::Cell;
use std::io;

use nix::errno::Errno;

use super::{Error, ProcRegistry};

pub(crate) const HOST_NS: &str = "user:[4026531837]";
pub(crate) const CONTAINER_NS: &str = "user:[4026532555]";

/// One process as a scripted registry reports it.
#[derive(Clone)]
pub(crate) enum FakeEntry {
    /// A live process in the given user namespace.
    Ns(u64, &'static str),
    /// Listed, but gone by the time its namespace is read.
    Vanished(u64),
    /// Listed, but its namespace link is unreadable.
    Denied(u64),
}

impl FakeEntry {
    fn pid(&self) -> u64 {
        match self {
            FakeEntry::Ns(pid, _) | FakeEntry::Vanished(pid) | FakeEntry::Denied(pid) => *pid,
        }
    }
}

/// A registry that replays a sequence of snapshots, advancing one snapshot
/// per `list_pids` call and repeating the last one once exhausted.
pub(crate) struct FakeRegistry {
    self_ns: Option<&'static str>,
    snapshots: Vec<Option<Vec<FakeEntry>>>,
    listed: Cell<usize>,
}

fn ns_error(pid: u64, errno: Errno) -> Error {
    Error::Namespace {
        entry: pid.to_string(),
        source: io::Error::from_raw_os_error(errno as i32),
    }
}

impl FakeRegistry {
    /// `self_ns` of `None` makes the caller's own link unreadable. A `None`
    /// snapshot makes that listing fail.
    pub(crate) fn new(
        self_ns: Option<&'static str>,
        snapshots: Vec<Option<Vec<FakeEntry>>>,
    ) -> Self {
        assert!(!snapshots.is_empty());
        FakeRegistry {
            self_ns,
            snapshots,
            listed: Cell::new(0),
        }
    }

    /// Snapshots holding `counts[i]` processes in the container namespace
    /// alongside two host processes.
    pub(crate) fn with_counts(counts: &[usize]) -> Self {
        let snapshots = counts
            .iter()
            .map(|&n| {
                let mut entries = vec![FakeEntry::Ns(1, HOST_NS), FakeEntry::Ns(2, HOST_NS)];
                entries.extend((0..n as u64).map(|i| FakeEntry::Ns(100 + i, CONTAINER_NS)));
                Some(entries)
            })
            .collect();
        FakeRegistry::new(Some(CONTAINER_NS), snapshots)
    }

    /// Number of `list_pids` calls so far.
    pub(crate) fn listings(&self) -> usize {
        self.listed.get()
    }

    fn current(&self) -> Option<&Vec<FakeEntry>> {
        let idx = self.listed.get().saturating_sub(1).min(self.snapshots.len() - 1);
        self.snapshots[idx].as_ref()
    }
}

impl ProcRegistry for FakeRegistry {
    fn list_pids(&self) -> Result<Vec<u64>, Error> {
        self.listed.set(self.listed.get() + 1);
        match self.current() {
            Some(entries) => Ok(entries.iter().map(FakeEntry::pid).collect()),
            None => Err(Error::Registry {
                root: "/fake".to_string(),
                source: io::Error::from_raw_os_error(Errno::EACCES as i32),
            }),
        }
    }

    fn user_ns(&self, pid: u64) -> Result<String, Error> {
        let entry = self
            .current()
            .and_then(|entries| entries.iter().find(|e| e.pid() == pid));
        match entry {
            Some(FakeEntry::Ns(_, ns)) => Ok(ns.to_string()),
            Some(FakeEntry::Denied(_)) => Err(ns_error(pid, Errno::EACCES)),
            Some(FakeEntry::Vanished(_)) | None => Err(ns_error(pid, Errno::ESRCH)),
        }
    }

    fn self_user_ns(&self) -> Result<String, Error> {
        match self.self_ns {
            Some(ns) => Ok(ns.to_string()),
            None => Err(ns_error(0, Errno::EACCES)),
        }
    }
}
