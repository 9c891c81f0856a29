use clap::Parser;
use tokio::net::TcpListener;

use strata_pages::logger::Logger;
use strata_pages::{build_app, Cli, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = Cli::parse().into_config();
    log::debug!("Starting with {:?}", config);

    let app = build_app(&config).await?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Wiki listening on http://{}", addr);
    axum::serve(listener, app).await.map_err(WikiError::from)
}
