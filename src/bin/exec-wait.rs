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

use std::io::{self, IsTerminal};
use std::process;

use exec_wait::{resolve, Config, LiveRegistry, ThreadSleep, Waiter};
use nix::unistd::getpid;
use tracing::debug;
use tracing_subscriber::EnvFilter;

struct Args {
    debug: bool,
}

fn print_usage() {
    eprintln!("Usage: exec-wait [-d]");
    eprintln!("Wait for additional processes in this user namespace to start and finish.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -d               Print diagnostics to standard output");
    eprintln!("  -h, --help       Print help");
    eprintln!("  -V, --version    Print version");
}

fn parse_args() -> Args {
    use lexopt::prelude::*;

    let mut args = Args { debug: false };
    let mut parser = lexopt::Parser::from_env();

    while let Some(arg) = parser.next().unwrap_or_else(|e| {
        eprintln!("exec-wait: {e}");
        process::exit(2);
    }) {
        match arg {
            Short('d') => args.debug = true,
            Short('h') | Long("help") => {
                print_usage();
                process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("exec-wait {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            _ => {
                eprintln!("exec-wait: unexpected argument: {arg:?}");
                process::exit(2);
            }
        }
    }
    args
}

fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stdout)
            .with_ansi(io::stdout().is_terminal())
            .without_time()
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .init();
    }
}

fn main() {
    let args = parse_args();
    init_tracing(args.debug);

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("exec-wait: {e}");
        process::exit(2);
    });
    debug!(
        interval_ms = config.interval.as_millis() as u64,
        start_policy = %config.start_policy,
        proc_root = %config.proc_root.display(),
        "configuration"
    );

    let registry = LiveRegistry::new(&config.proc_root);
    let token = resolve(&registry);
    debug!(pid = getpid().as_raw(), "user namespace {}", token);

    let report = Waiter::new(&registry, token, &config, ThreadSleep).run();
    debug!(
        baseline = report.baseline,
        peak = report.peak,
        samples = report.samples,
        "finished"
    );
}
