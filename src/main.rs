use std::env;
use std::process;

use crownforge::cli;
use crownforge::config::LOG_ENV;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
