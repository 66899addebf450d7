use relayboard::{config::Config, error::AppError, startup};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    startup::init_tracing();

    let config = Config::load()?;

    tracing::info!("Starting relayboard for {}", config.server_name);

    startup::run(config).await
}
