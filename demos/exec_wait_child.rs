use std::env;
use std::fs::File;
use std::thread;
use std::time::Duration;

fn main() {
    let ready_path =
        env::var("EXEC_WAIT_TEST_READY_FILE").expect("EXEC_WAIT_TEST_READY_FILE must be set");

    // How long to stay alive after signalling readiness.
    let delay_ms: u64 = env::var("EXEC_WAIT_TEST_DELAY_MS")
        .unwrap_or_else(|_| "200".to_string())
        .parse()
        .expect("EXEC_WAIT_TEST_DELAY_MS must be a number");

    File::create(ready_path).unwrap();

    thread::sleep(Duration::from_millis(delay_ms));
}
