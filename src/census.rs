use std::fmt;

use tracing::{debug, trace};

use crate::proc::ProcRegistry;

/// Identity of a user namespace, as read from an `ns/user` link
/// (e.g. `user:[4026531837]`).
///
/// The empty token stands for a namespace that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UserNsToken(String);

impl UserNsToken {
    pub fn new(token: impl Into<String>) -> Self {
        UserNsToken(token.into())
    }

    pub fn empty() -> Self {
        UserNsToken(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserNsToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "<unresolved>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Resolve the caller's user namespace.
///
/// Never fails: an unreadable link yields the empty token, which only
/// matches processes whose own link was unreadable too.
pub fn resolve<R: ProcRegistry + ?Sized>(registry: &R) -> UserNsToken {
    match registry.self_user_ns() {
        Ok(token) => UserNsToken::new(token),
        Err(e) => {
            debug!("{}; matching on the empty token", e);
            UserNsToken::empty()
        }
    }
}

/// Token of a single registry entry, or `None` if the process exited
/// before we could look at it.
fn entry_token<R: ProcRegistry + ?Sized>(registry: &R, pid: u64) -> Option<UserNsToken> {
    match registry.user_ns(pid) {
        Ok(token) => Some(UserNsToken::new(token)),
        Err(e) if e.is_vanished() => {
            trace!(pid, "exited during scan");
            None
        }
        Err(e) => {
            trace!(pid, "{}", e);
            Some(UserNsToken::empty())
        }
    }
}

/// Result of one pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    /// Processes whose namespace matched.
    pub matching: usize,
    /// Processes still alive when inspected.
    pub scanned: usize,
}

/// Take a fresh census of processes in the namespace identified by `token`.
///
/// If the registry cannot be listed, the pass counts nothing.
pub fn sample<R: ProcRegistry + ?Sized>(registry: &R, token: &UserNsToken) -> Census {
    let pids = match registry.list_pids() {
        Ok(pids) => pids,
        Err(e) => {
            debug!("{}; counting 0 for this pass", e);
            return Census::default();
        }
    };

    let mut census = Census::default();
    for pid in pids {
        if let Some(found) = entry_token(registry, pid) {
            census.scanned += 1;
            if found == *token {
                census.matching += 1;
            }
        }
    }
    census
}

/// Number of live processes whose user namespace is `token`.
pub fn count_matching<R: ProcRegistry + ?Sized>(registry: &R, token: &UserNsToken) -> usize {
    sample(registry, token).matching
}
