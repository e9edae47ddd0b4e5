//! GIWA Bridge HTTP 服务入口

use std::sync::Arc;

use anyhow::{Context, Result};
use giwa_bridge::{
    api, app_state::AppState, config::Config, domain::Account, infrastructure::init_logging,
    service::BridgeService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ✅ 1. 加载环境变量
    dotenvy::dotenv().ok();

    // ✅ 2. 加载配置（CONFIG_PATH 指向的 TOML 文件优先）
    let config = Config::load().context("Invalid configuration")?;

    // ✅ 3. 初始化日志
    init_logging(&config.logging)?;
    tracing::info!("🚀 Starting GIWA Bridge");

    // ✅ 4. 加载账户（缺少私钥直接退出）
    let account = match Account::from_env() {
        Ok(account) => account,
        Err(e) => {
            tracing::error!("❌ {}", e);
            return Err(e.into());
        }
    };
    tracing::info!(address = ?account.address(), "✅ Wallet loaded");

    // ✅ 5. 初始化链客户端与应用状态
    let bridge = Arc::new(BridgeService::from_config(&config, &account)?);
    let config = Arc::new(config);
    let state = Arc::new(AppState::new(config.clone(), bridge));

    tracing::info!(
        l1 = %config.l1.name,
        l1_chain_id = config.l1.chain_id,
        l2 = %config.l2.name,
        l2_chain_id = config.l2.chain_id,
        min_transfer_eth = %config.bridge.min_transfer_eth,
        "✅ Bridge configured"
    );

    // ✅ 6. 启动服务器
    let app = api::routes(state);
    let bind_addr = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("🎉 Server listening on http://{}", bind_addr);
    tracing::info!("📖 OpenAPI: http://{}/openapi.json", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("👋 Shutting down");
}
