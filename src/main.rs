//! docquery server entry point

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use docquery::api::{self, AppState};
use docquery::config::{Args, ServerConfig};
use docquery::logging;
use docquery::source::MemorySource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = ServerConfig::from(&args);
    logging::init(&config.log_level);

    let source = match &config.data_file {
        Some(path) => {
            let source = MemorySource::load_file(path)?;
            info!(
                path = %path.display(),
                collections = ?source.collection_names(),
                "fixtures loaded"
            );
            source
        }
        None => MemorySource::new(),
    };

    let state = AppState::new(Arc::new(source), config);
    api::serve(state).await?;
    Ok(())
}
