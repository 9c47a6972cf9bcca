use std::env;
use std::path::Path;

use colored::Colorize;
use handoff::logging::init_tracing;
use handoff::{race, DeadlineConfig, Raced};
use tokio::time::sleep;

// Usage: deadline [config.toml]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config = match env::args().nth(1) {
        Some(path) => DeadlineConfig::from_file(Path::new(&path))?,
        None => DeadlineConfig::default(),
    };

    tracing::info!(
        work_ms = config.work_ms,
        deadline_ms = config.deadline_ms,
        "racing work against deadline"
    );

    let work = async {
        sleep(config.work()).await;
        "Hello, World!"
    };

    match race(work, sleep(config.deadline())).await {
        Raced::Completed(body) => println!("{}", body.green()),
        Raced::DeadlineElapsed | Raced::Cancelled => println!("{}", "Request timeout".red()),
    }

    Ok(())
}
