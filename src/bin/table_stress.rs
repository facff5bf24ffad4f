//! Stress driver: bulk put of generated `keyN -> valueN` pairs, a full
//! verification pass, then draining the table to reclaim every value.
//!
//! Usage: `table-stress [ITERATIONS]`. Exits 0 on success, 1 on the first
//! mismatch, 2 on a bad argument. `RUST_LOG` controls output (default `info`).

use std::process::ExitCode;
use strtab::Table;

const DEFAULT_ITERATIONS: usize = 1024 * 1024;
const PROGRESS_EVERY: usize = 1024;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let iterations = match std::env::args().nth(1) {
        None => DEFAULT_ITERATIONS,
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) => n,
            Err(err) => {
                log::error!("invalid iteration count {arg:?}: {err}");
                return ExitCode::from(2);
            }
        },
    };

    // Keys are owned here and borrowed by the table for its whole life.
    let keys: Vec<String> = (0..iterations).map(|i| format!("key{i}")).collect();
    let mut table = Table::new();

    log::info!("put {iterations} ever-increasing keys");
    for (i, key) in keys.iter().enumerate() {
        if i % PROGRESS_EVERY == 0 {
            log::debug!("{key}");
        }
        table.put(key.as_str(), format!("value{i}"));
    }

    log::info!("verify");
    for i in 0..iterations {
        let key = format!("key{i}");
        let expected = format!("value{i}");
        match table.get(key.as_str()) {
            Some(got) if *got == expected => {}
            got => {
                log::error!("mismatch - {key} ({expected} != {got:?})");
                return ExitCode::from(1);
            }
        }
    }
    log::info!("verify succeeded ({} entries, {} slots)", table.len(), table.capacity());

    log::info!("free");
    let reclaimed = table.into_iter().count();
    log::info!("free complete ({reclaimed} values reclaimed)");
    ExitCode::SUCCESS
}
