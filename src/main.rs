//! mllib-score - runs one scoring operator over stdin/stdout

use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use streamsx_mllib::constants::{APP_NAME, APP_VERSION, CONTROL_CHANNEL_CAPACITY};
use streamsx_mllib::logic::runtime::ControlFileWatcher;
use streamsx_mllib::{build_operator, OperatorConfig, OperatorRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = OperatorConfig::from_env().context("Failed to load operator config")?;
    log::info!(
        "Operator '{}' ({:?}), model: {}",
        config.name,
        config.operator,
        config.model_path.display()
    );

    let operator = build_operator(&config).context("Operator failed to start")?;

    let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    let _watcher = match &config.control_file {
        Some(path) => Some(
            ControlFileWatcher::spawn(path.clone(), control_tx)
                .with_context(|| format!("Failed to watch control file {}", path.display()))?,
        ),
        None => {
            drop(control_tx);
            None
        }
    };

    let runner = OperatorRunner::new(Arc::clone(&operator));
    let summary = runner
        .run(BufReader::new(tokio::io::stdin()), control_rx, tokio::io::stdout())
        .await?;

    log::info!("Run summary: {}", serde_json::to_string(&summary)?);
    log::info!("Operator status: {}", serde_json::to_string(&operator.status())?);
    Ok(())
}
