use std::sync::Arc;

use coachdesk_core::widgets::WidgetRegistry;
use coachdesk_db::DbPool;

use crate::config::ServerConfig;

/// Handler state, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    /// Overview widgets known to this build; stored layouts are reconciled
    /// against it.
    pub registry: Arc<WidgetRegistry>,
}
