mod logging;
mod workflow;

use std::path::Path;

use common::utils::config::get_config;
use rag_client::http::HttpRagClient;
use tracing::{error, info};
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config first: the log file path comes from it.
    let config = get_config()?;
    logging::init_logging(Path::new(&config.log_file))?;

    let run_id = Uuid::new_v4();
    info!(%run_id, "===== RAG WORKFLOW STARTED =====");

    info!("STEP 1: Initializing RAG service client");
    info!(
        "Project ID: {}, Location: {}",
        config.project_id, config.location
    );
    let client = match HttpRagClient::new(&config) {
        Ok(client) => {
            info!("RAG service client initialized");
            client
        }
        Err(e) => {
            error!("Client initialization failed: {e}");
            return Err(e.into());
        }
    };

    workflow::run(&client, &config).await?;

    info!("===== RAG WORKFLOW COMPLETED =====");
    Ok(())
}
