use std::sync::Arc;

use eventica_core::EventicaResult;
use eventica_core::service::EventService;
use eventica_core::store::AnyStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<EventService<AnyStore>>,
    /// Bearer token guarding mutating routes, if configured
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(service: EventService<AnyStore>, admin_token: Option<String>) -> Self {
        AppState {
            service: Arc::new(service),
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Run a service call on the blocking pool. Store access waits on file
    /// locks and the connection mutex.
    pub async fn blocking<T, F>(&self, call: F) -> anyhow::Result<T>
    where
        F: FnOnce(&EventService<AnyStore>) -> EventicaResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.service);
        Ok(tokio::task::spawn_blocking(move || call(&service)).await??)
    }

    /// Take the service back once no other clone of the state is alive.
    pub fn into_service(self) -> Option<EventService<AnyStore>> {
        Arc::try_unwrap(self.service).ok()
    }
}
