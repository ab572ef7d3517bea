//! The streamgate server binary.

use streamgate_server::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    streamgate_server::init_tracing(&config);
    streamgate_server::serve(config).await
}
