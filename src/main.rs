use std::sync::Arc;

use log::info;

use campaign_relay::config::Config;
use campaign_relay::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let config = Config::from_env();
    info!("Provider API: {}", config.provider_base_url);
    if let Some(cap) = config.message_log_capacity {
        info!("Keeping at most {} inbound messages", cap);
    }

    let state = Arc::new(AppState::from_config(&config));
    let app = campaign_relay::router(state);

    let addr = config.bind_addr();
    info!("Campaign relay running on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
