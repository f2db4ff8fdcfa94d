use std::sync::Arc;

use jornada_bot::config::Config;
use jornada_bot::router::SessionRouter;
use jornada_bot::sheets::{RowSink, SheetsClient, credentials};
use jornada_bot::telegram::TelegramApi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let creds = credentials::load(&config.credentials)?;

    let api = Arc::new(TelegramApi::new(
        config.bot_token.clone(),
        config.proxy_url.as_deref(),
    )?);

    // Verify the token before polling; a bad token is fatal here.
    let me = api.get_me().await?;

    eprintln!("🤖 Jornada Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Bot: @{}", me.username.as_deref().unwrap_or("unknown"));
    if let Some(proxy) = &config.proxy_url {
        eprintln!("   Proxy: {proxy}");
    }
    eprintln!("   Sheet: {} / {}", config.spreadsheet_id, config.sheet_name);
    eprintln!(
        "   Allowed: {}",
        if config.allowed_users.iter().any(|u| u == "*") {
            "everyone".to_string()
        } else {
            config.allowed_users.join(", ")
        }
    );

    let sink: Arc<dyn RowSink> = Arc::new(SheetsClient::new(
        creds,
        config.spreadsheet_id.clone(),
        config.sheet_name.clone(),
    ));

    let router = SessionRouter::new(api, sink, config.allowed_users.clone());
    router.run().await;

    Ok(())
}
