//! The wait loop: capture a baseline census, wait for it to move, then wait
//! for it to fall back to the baseline or below.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use crate::census::{sample, UserNsToken};
use crate::config::Config;
use crate::proc::ProcRegistry;

/// Something that can block the calling thread between samples.
pub trait Sleep {
    fn sleep(&mut self, duration: Duration);
}

/// Blocks with `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

impl<S: Sleep + ?Sized> Sleep for &mut S {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// When the census counts as "additional processes have started".
///
/// `AnyChange` leaves `AwaitingStart` on any move away from the baseline,
/// including a drop caused by an unrelated process exiting. `Increase`
/// requires the count to rise above the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPolicy {
    #[default]
    AnyChange,
    Increase,
}

impl StartPolicy {
    pub fn started(self, baseline: usize, count: usize) -> bool {
        match self {
            StartPolicy::AnyChange => count != baseline,
            StartPolicy::Increase => count > baseline,
        }
    }
}

impl FromStr for StartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-change" => Ok(StartPolicy::AnyChange),
            "increase" => Ok(StartPolicy::Increase),
            _ => Err("expected 'any-change' or 'increase'".to_string()),
        }
    }
}

impl fmt::Display for StartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartPolicy::AnyChange => write!(f, "any-change"),
            StartPolicy::Increase => write!(f, "increase"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Baseline,
    AwaitingStart { baseline: usize },
    AwaitingDrain { baseline: usize },
    Done { baseline: usize },
}

impl WaitState {
    pub fn is_done(&self) -> bool {
        matches!(self, WaitState::Done { .. })
    }
}

/// Summary of a completed wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitReport {
    pub baseline: usize,
    /// Highest count observed while waiting.
    pub peak: usize,
    /// Number of census passes taken, including the baseline.
    pub samples: usize,
}

pub struct Waiter<R, S> {
    registry: R,
    token: UserNsToken,
    interval: Duration,
    policy: StartPolicy,
    sleeper: S,
    state: WaitState,
    samples: usize,
    peak: usize,
}

impl<R: ProcRegistry, S: Sleep> Waiter<R, S> {
    pub fn new(registry: R, token: UserNsToken, config: &Config, sleeper: S) -> Self {
        Waiter {
            registry,
            token,
            interval: config.interval,
            policy: config.start_policy,
            sleeper,
            state: WaitState::Baseline,
            samples: 0,
            peak: 0,
        }
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    fn count(&mut self) -> usize {
        let census = sample(&self.registry, &self.token);
        self.samples += 1;
        self.peak = self.peak.max(census.matching);
        debug!(
            matching = census.matching,
            scanned = census.scanned,
            "census"
        );
        census.matching
    }

    /// Take one sample and advance the state machine.
    ///
    /// A waiting state that is not left after its sample sleeps for one
    /// interval before returning. Stepping a finished waiter does nothing.
    pub fn step(&mut self) -> WaitState {
        self.state = match self.state {
            WaitState::Baseline => {
                let baseline = self.count();
                info!(
                    "{} processes in user namespace {}",
                    baseline, self.token
                );
                WaitState::AwaitingStart { baseline }
            }
            WaitState::AwaitingStart { baseline } => {
                let count = self.count();
                if self.policy.started(baseline, count) {
                    info!("process count moved from {} to {}", baseline, count);
                    WaitState::AwaitingDrain { baseline }
                } else {
                    debug!("waiting for additional processes to start");
                    self.sleeper.sleep(self.interval);
                    WaitState::AwaitingStart { baseline }
                }
            }
            WaitState::AwaitingDrain { baseline } => {
                let count = self.count();
                if count <= baseline {
                    info!("done");
                    WaitState::Done { baseline }
                } else {
                    debug!("waiting for additional processes to finish");
                    self.sleeper.sleep(self.interval);
                    WaitState::AwaitingDrain { baseline }
                }
            }
            done @ WaitState::Done { .. } => done,
        };
        self.state
    }

    /// Step until done. There is no timeout.
    pub fn run(mut self) -> WaitReport {
        loop {
            if let WaitState::Done { baseline } = self.step() {
                return WaitReport {
                    baseline,
                    peak: self.peak,
                    samples: self.samples,
                };
            }
        }
    }
}
