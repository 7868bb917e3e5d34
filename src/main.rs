//! ASAG experiment entrypoint.

use std::sync::Arc;

use mimalloc::MiMalloc;

use asag::config::Config;
use asag::embedding::{EmbeddingTable, device_label, select_device};
use asag::experiment::{ExperimentContext, ExperimentRunner};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    if config.item_ids.is_empty() {
        tracing::warn!("ASAG_ITEM_IDS is empty; the report will be empty");
    }

    let embeddings_path = config.require_embeddings_path()?;
    tracing::info!(
        path = %embeddings_path.display(),
        dim = config.embedding_dim,
        "Loading embeddings"
    );
    let table = Arc::new(EmbeddingTable::from_glove_file(
        embeddings_path,
        config.embedding_dim,
    )?);
    tracing::info!(tokens = table.len(), "Embeddings loaded");

    let device = select_device(config.device)?;
    tracing::info!(
        device = device_label(&device),
        items = config.item_ids.len(),
        optimizer = %config.training.optimizer,
        epochs = config.training.epochs,
        "ASAG starting"
    );

    let context = ExperimentContext::new(table, device, config.token_limit)?;
    let runner = ExperimentRunner::new(context, config);
    let report = runner.run_all()?;

    for item in report.items() {
        tracing::info!(item_id = %item.item_id, accuracy = item.accuracy, "Result");
    }
    tracing::info!("ASAG finished");
    Ok(())
}
