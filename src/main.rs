use clap::Parser;
use hows_my_driving::domain::ports::ConfigProvider;
use hows_my_driving::utils::{logger, validation::Validate};
use hows_my_driving::{build_lookup_service, create_router, AppConfig, AppState, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting hows-my-driving");

    let config = AppConfig::from_cli(&cli)?;
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let service = build_lookup_service(&config)?;
    let app = create_router(AppState::new(service), config.public_dir());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("✅ Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
