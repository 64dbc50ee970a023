use std::path::PathBuf;
use std::time::Duration;

use crate::proc::live::DEFAULT_PROC_ROOT;
use crate::proc::Error;
use crate::wait::StartPolicy;

pub const INTERVAL_VAR: &str = "EXEC_WAIT_INTERVAL_MS";
pub const START_POLICY_VAR: &str = "EXEC_WAIT_START_POLICY";
pub const PROC_ROOT_VAR: &str = "EXEC_WAIT_PROC_ROOT";

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Runtime settings. There is no configuration file; each field can be
/// overridden from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Delay between samples while waiting.
    pub interval: Duration,
    /// What counts as "additional processes started".
    pub start_policy: StartPolicy,
    /// Where the process registry is mounted.
    pub proc_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            interval: DEFAULT_INTERVAL,
            start_policy: StartPolicy::default(),
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Config::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from defaults plus whatever `lookup` returns for each
    /// override variable. Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(val) = get(INTERVAL_VAR) {
            let ms = val
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::config(INTERVAL_VAR, &val, &e.to_string()))?;
            config.interval = Duration::from_millis(ms);
        }
        if let Some(val) = get(START_POLICY_VAR) {
            config.start_policy = val
                .trim()
                .parse::<StartPolicy>()
                .map_err(|reason| Error::config(START_POLICY_VAR, &val, &reason))?;
        }
        if let Some(val) = get(PROC_ROOT_VAR) {
            config.proc_root = PathBuf::from(val);
        }

        Ok(config)
    }
}
