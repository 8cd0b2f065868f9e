//! Session state, HTTP transport boundary and persistence for Raider.
//!
//! This crate owns everything that is not a plugin or a flow: the
//! cookie jar, the plugin-value store, the active user, the HTTP client
//! boundary, and session dump/reload.

pub mod cookie_jar;
pub mod error;
pub mod graph;
pub mod http_client;
pub mod persistence;
pub mod session;
pub mod transport;
pub mod user;

pub use cookie_jar::CookieJar;
pub use error::RaiderError;
pub use graph::FlowGraph;
pub use http_client::{HttpClient, HttpRequestSpec, HttpResponseSpec, ReqwestHttpClient};
pub use persistence::{FileSessionStore, PersistedSession, SessionStore};
pub use session::Session;
pub use transport::TransportConfig;
pub use user::{User, UserStore};
