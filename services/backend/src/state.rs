use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::repository::Storage;
use crate::services::mailer::Mailer;
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Storage>,
    pub sessions: SessionStore,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn Storage>,
        sessions: SessionStore,
        mailer: Arc<dyn Mailer>,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            sessions,
            mailer,
            metrics,
        }
    }
}
