use std::sync::Arc;

use crate::{config::Config, service::BridgeService};

/// 应用状态
/// 包含所有共享资源
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bridge: Arc<BridgeService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, bridge: Arc<BridgeService>) -> Self {
        Self { config, bridge }
    }
}
