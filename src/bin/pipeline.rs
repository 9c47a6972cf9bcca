use std::env;
use std::path::Path;

use colored::Colorize;
use handoff::logging::init_tracing;
use handoff::{async_pipeline, run_pipeline, PipelineConfig, PipelineReport};

// Usage: pipeline [--async] [config.toml]
fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let mut use_async = false;
    let mut config_path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--async" => use_async = true,
            path => config_path = Some(path.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => PipelineConfig::from_file(Path::new(&path))?,
        None => PipelineConfig::default(),
    };

    println!(
        "{} {} values through a queue of {}",
        "Piping".bold(),
        config.count,
        config.capacity
    );

    let report = if use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        let (report, _) = runtime.block_on(async_pipeline::run_pipeline(&config, print_consumed))?;
        report
    } else {
        let mut sink = print_consumed;
        run_pipeline(&config, &mut sink)?
    };

    print_report(&report);
    Ok(())
}

fn print_consumed(value: u64) {
    println!("{} {}", "Consumed:".green(), value);
}

fn print_report(report: &PipelineReport) {
    println!(
        "{} produced {}, consumed {}, peak queue length {}/{}",
        "Done:".bold(),
        report.produced,
        report.consumed,
        report.high_water_mark,
        report.capacity
    );
}
