//! StockSence server binary.
//!
//! ```text
//! stocksence-server [--config <path>]
//! ```

use std::path::PathBuf;

use anyhow::bail;
use tracing::info;

use stocksence_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stocksence_server::init_tracing();

    let config_path = parse_config_arg(std::env::args().skip(1))?;
    let config = ServerConfig::load(config_path)?;
    info!(
        addr = %config.server.bind_address(),
        utc_offset_minutes = config.report.utc_offset_minutes,
        "Configuration loaded"
    );

    stocksence_server::run(config).await
}

fn parse_config_arg(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(value) => path = Some(PathBuf::from(value)),
                None => bail!("--config requires a path"),
            },
            other => bail!("unknown argument '{}'", other),
        }
    }
    Ok(path)
}
