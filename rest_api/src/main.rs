// rest_api/src/main.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use readmission::{BinaryClassifier, GradientBoostingModel};
use rest_api::config::{resolve_config, CliArgs};
use rest_api::start_server;
use tokio::sync::oneshot;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = resolve_config(&args)?;

    // The model must load before the port is bound; a broken artifact never serves traffic.
    let model = GradientBoostingModel::from_path(&config.model_path)
        .with_context(|| format!("Failed to load model artifact {}", config.model_path.display()))?;

    if args.check_model {
        info!(
            "Model artifact {} is valid: classes {:?}, {} trees over {} encoded features",
            config.model_path.display(),
            model.classes(),
            model.n_trees(),
            model.encoded_width()
        );
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C, graceful shutdown disabled: {}", e);
            std::future::pending::<()>().await;
        }
        let _ = shutdown_tx.send(());
    });

    let model: Arc<dyn BinaryClassifier> = Arc::new(model);
    start_server(&config, model, shutdown_rx).await
}
