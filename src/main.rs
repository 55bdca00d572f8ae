//! perf-scope viewer
//!
//! Usage: `perf-scope [--config <path>]`

use anyhow::{bail, Context, Result};
use perf_scope::ViewerConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("perf-scope v{}", perf_scope::VERSION);

    // Parse command line arguments
    let config_path = parse_config_arg(std::env::args().skip(1))?;
    let config = ViewerConfig::discover(config_path.as_deref()).context("failed to load configuration")?;

    perf_scope::launch_viewer(config)
}

fn parse_config_arg(mut args: impl Iterator<Item = String>) -> Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(value) => path = Some(PathBuf::from(value)),
                None => bail!("--config needs a path"),
            },
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_parse_config_arg() {
        assert_eq!(parse_config_arg(args(&[])).unwrap(), None);
        assert_eq!(
            parse_config_arg(args(&["--config", "a.json"])).unwrap(),
            Some(PathBuf::from("a.json"))
        );
        assert!(parse_config_arg(args(&["--config"])).is_err());
        assert!(parse_config_arg(args(&["--zoom"])).is_err());
    }
}
