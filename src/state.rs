use std::sync::Arc;

use crate::{
    backend::{HostedBackend, MemoryBackend, SupabaseClient},
    config::{AppConfig, BackendMode},
};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn HostedBackend>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn HostedBackend>, config: AppConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Connects the backend selected by `config.backend`.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let backend: Arc<dyn HostedBackend> = match config.backend {
            BackendMode::Supabase => Arc::new(SupabaseClient::new(&config)?),
            BackendMode::Memory => {
                tracing::warn!("using the in-memory backend; data is lost on restart");
                Arc::new(MemoryBackend::new(config.supabase_url.clone()))
            }
        };
        Ok(Self::new(backend, config))
    }
}
