//
//   Copyright 2026 Basil Crow
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.
//

// Error handling philosophy: the wait loop must stay alive. A supervisor blocks on us until the
// work exec'd into its container finishes, so nothing we read from /proc is allowed to abort the
// wait. A process that exits mid-scan is dropped from the count, an unreadable namespace link
// degrades to the empty token, and a registry that cannot be listed counts as zero for that pass.
// Only bad configuration, which is detected before the first sample, is fatal.

pub mod census;
pub mod config;
pub mod proc;
pub mod wait;

pub use census::{count_matching, resolve, sample, Census, UserNsToken};
pub use config::Config;
pub use proc::{Error, LiveRegistry, ProcRegistry};
pub use wait::{Sleep, StartPolicy, ThreadSleep, WaitReport, WaitState, Waiter};
