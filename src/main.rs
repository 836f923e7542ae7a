use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use script_sandbox::args::Args;
use script_sandbox::runner;

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let bridge = script_sandbox::default_bridge()?;
    runner::run(&bridge, args.command)
}
