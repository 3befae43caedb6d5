use std::process;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use qaforge::application::TestGenerationUseCase;
use qaforge::infrastructure::config::RuntimeConfig;
use qaforge::infrastructure::llm_clients::{ClientSettings, OpenAiClient};
use qaforge::interfaces::http::{start_server, HttpState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = match RuntimeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            process::exit(1);
        }
    };

    let client = match OpenAiClient::new(ClientSettings {
        base_url: config.base_url.clone(),
        api_key: config.api_key.clone(),
    }) {
        Ok(client) => client,
        Err(err) => {
            error!(error = %err, "failed to construct completion client");
            process::exit(1);
        }
    };

    let generation = Arc::new(TestGenerationUseCase::new(Arc::new(client)));

    let state = HttpState {
        generation,
        completion: config.completion.clone(),
        limits: config.limits.clone(),
    };

    let server = start_server(state, &config.bind_addr, config.port)?;
    info!(addr = %config.bind_addr, port = config.port, "qaforge API listening");

    server.await
}
