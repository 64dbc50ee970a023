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

#![allow(dead_code)]

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

// Find an executable produced by the Cargo build
pub fn find_exec(name: &str) -> PathBuf {
    // Find the path where Cargo has placed the executables by looking at this test process's
    // executable, which was also built by Cargo.
    let this_exec = std::env::current_exe().unwrap();
    let exec_dir = this_exec.parent().unwrap().parent().unwrap();

    exec_dir.join(name)
}

/// A file the child creates once it is up and running.
pub struct ReadySignal {
    dir: TempDir,
}

impl ReadySignal {
    pub fn new() -> Self {
        ReadySignal {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> PathBuf {
        self.dir.path().join("ready")
    }

    pub fn apply_to_command(&self, cmd: &mut Command) {
        cmd.env("EXEC_WAIT_TEST_READY_FILE", self.path());
    }

    pub fn wait_for_readiness(&self, child: &mut Child) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !self.path().exists() {
            if let Some(status) = child.try_wait().unwrap() {
                panic!("child exited before becoming ready: {}", status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                panic!("timed out waiting for child to become ready");
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}

/// Forward a child's output lines over a channel so tests can wait for a
/// particular line without blocking forever.
pub fn line_channel<R: std::io::Read + Send + 'static>(reader: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// Receive lines until one contains `needle`, returning every line seen.
pub fn wait_for_line(rx: &Receiver<String>, needle: &str, timeout: Duration) -> Vec<String> {
    let deadline = Instant::now() + timeout;
    let mut seen = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(line) => {
                let found = line.contains(needle);
                seen.push(line);
                if found {
                    return seen;
                }
            }
            Err(_) => panic!("no line containing {:?} in time; saw {:?}", needle, seen),
        }
    }
}

/// Wait for a child to exit, killing it and failing the test on timeout.
pub fn wait_with_timeout(child: &mut Child, timeout: Duration) -> std::process::ExitStatus {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            panic!("child {} did not exit within {:?}", child.id(), timeout);
        }
        thread::sleep(Duration::from_millis(10));
    }
}
