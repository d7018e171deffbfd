//! Headless site report.
//!
//! ```text
//! sitekit [--config <file>] [--data <scene.json>] [report | write-config]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use sitekit::{init_logging, open_site, SiteConfig};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    data: Option<PathBuf>,
    write_config: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => args.config = Some(iter.next().context("--config needs a path")?.into()),
            "--data" => args.data = Some(iter.next().context("--data needs a path")?.into()),
            "report" => args.write_config = false,
            "write-config" => args.write_config = true,
            "-h" | "--help" => {
                println!("usage: sitekit [--config <file>] [--data <scene.json>] [report | write-config]");
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("SiteKit {} (built {})", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"));

    let args = parse_args()?;
    let config_path = match args.config {
        Some(path) => path,
        None => SiteConfig::default_path()?,
    };
    let mut config = SiteConfig::load_or_default(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;

    if args.write_config {
        config
            .save_to_file(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    if let Some(data) = args.data {
        config.persistence.data_file = data;
    }

    let mut site = open_site(&config);
    let count = site
        .load_from_gateway()
        .await
        .with_context(|| format!("loading {}", config.persistence.data_file.display()))?;
    if count == 0 {
        println!("No records in {}", config.persistence.data_file.display());
    }
    print!("{}", site.report());
    Ok(())
}
