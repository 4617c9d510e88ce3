//! Identifier benchmark launcher
//!
//! Usage: `id-bench [run|list|config] [FILTER...]`

use id_bench::bench::{fork, print_summary, run_forked, IN_FORK_FLAG};
use id_bench::config::LoggingConfig;
use id_bench::{Config, Operation, Runner};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    // stdout is reserved for results when running as a fork
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_writer(std::io::stderr);

    let installed = if config.json_output {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))
}

fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    init_logging(&config.logging)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("run");

    match command {
        "list" => {
            for op in Operation::ALL {
                println!("{op}");
            }
            return Ok(());
        }
        "config" => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }
        "run" => {}
        other => anyhow::bail!("unknown command `{other}` (expected run, list or config)"),
    }

    let rest = args.get(1..).unwrap_or(&[]);
    let in_fork = rest.iter().any(|a| a == IN_FORK_FLAG);
    let filters: Vec<String> = rest.iter().filter(|a| *a != IN_FORK_FLAG).cloned().collect();

    if !filters.is_empty() {
        config.measurement.include = filters.clone();
    }
    if Operation::select(&config.measurement.include).is_empty() {
        anyhow::bail!("no benchmark matches {:?}", config.measurement.include);
    }

    if in_fork {
        let results = Runner::new(config).run_all()?;
        return fork::write_results(&results, std::io::stdout().lock());
    }

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║          ID-BENCH v{:<8} UUID vs String identifiers         ║", env!("CARGO_PKG_VERSION"));
    println!("╚═══════════════════════════════════════════════════════════════╝\n");

    let forks = config.measurement.forks;
    let results = if forks == 0 {
        Runner::new(config).run_all()?
    } else {
        run_forked(forks, &Operation::select(&config.measurement.include))?
    };

    print_summary(&results);
    info!("✅ {} benchmarks complete", results.len());
    Ok(())
}
