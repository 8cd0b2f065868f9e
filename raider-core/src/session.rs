use crate::cookie_jar::CookieJar;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::transport::TransportConfig;
use crate::user::UserStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-run state: cookie jar, plugin-value store, active user, HTTP
/// transport.
///
/// Owned exclusively by one authentication run: no interior mutability,
/// no locking — mutation happens only through `&mut Session`, which the
/// borrow checker refuses to hand out concurrently.
pub struct Session {
    pub cookies: CookieJar,
    /// Plugin-value store: last known value per plugin name.
    store: HashMap<String, String>,
    pub users: UserStore,
    pub transport: TransportConfig,
    pub base_url: Option<String>,
    http_client: Arc<dyn HttpClient>,
}

impl Session {
    pub fn new(transport: TransportConfig, users: UserStore) -> Result<Self, crate::error::RaiderError> {
        let http_client = Arc::new(ReqwestHttpClient::new(&transport)?);
        Ok(Self {
            cookies: CookieJar::new(),
            store: HashMap::new(),
            users,
            transport,
            base_url: None,
            http_client,
        })
    }

    /// Build a session around a caller-supplied transport (used by tests
    /// to inject a fake `HttpClient`).
    pub fn with_http_client(
        transport: TransportConfig,
        users: UserStore,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            cookies: CookieJar::new(),
            store: HashMap::new(),
            users,
            transport,
            base_url: None,
            http_client,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    /// Last known value for a plugin, if any.
    pub fn value_of(&self, plugin_name: &str) -> Option<&str> {
        self.store.get(plugin_name).map(|s| s.as_str())
    }

    /// Update (or clear) the stored value for a plugin.
    pub fn set_value(&mut self, plugin_name: impl Into<String>, value: Option<String>) {
        let name = plugin_name.into();
        match value {
            Some(v) => {
                self.store.insert(name, v);
            }
            None => {
                self.store.remove(&name);
            }
        }
    }

    /// A stable, sorted snapshot of the plugin-value store, so dumping it
    /// twice without mutation in between produces identical bytes.
    pub fn store_snapshot(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> =
            self.store.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        pairs.sort();
        pairs
    }

    pub fn restore_store(&mut self, pairs: Vec<(String, String)>) {
        self.store = pairs.into_iter().collect();
    }
}
