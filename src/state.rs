use std::sync::Arc;

use crate::config::AppConfig;
use crate::supabase::SupabaseClient;

/// Shared application state, constructed once at startup and cloned into
/// every handler. Replaces any notion of a global backend client.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supabase: SupabaseClient,
}

impl AppState {
    pub fn new(config: AppConfig, supabase: SupabaseClient) -> Self {
        Self {
            config: Arc::new(config),
            supabase,
        }
    }
}
