use registry::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info,sqlx=warn"))
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: service={} server={}",
        config.service.kind,
        config.server_address()
    );

    if let Err(e) = registry::run_server(config).await {
        log::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
