use std::sync::Arc;

use tokio::sync::Mutex;

use crate::auth::session::SessionStore;
use crate::backend::Backend;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub config: Config,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(backend: Arc<dyn Backend>, config: Config) -> Self {
        let sessions = SessionStore::new(config.auth.session_hours);
        Self {
            backend,
            config,
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }
}
