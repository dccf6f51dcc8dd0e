use std::net::TcpListener;
use std::sync::Arc;

use authgate::auth::SystemClock;
use authgate::configuration::get_configuration;
use authgate::startup::{build_gate, run};
use authgate::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry("info");

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let gate = build_gate(&configuration, Arc::new(SystemClock)).map_err(|e| {
        tracing::error!("Invalid authentication settings: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, gate, configuration.cors.clone())?;
    tracing::info!("Server started successfully");

    server.await
}
