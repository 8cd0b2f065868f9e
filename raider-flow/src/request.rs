use raider_core::http_client::HttpRequestSpec;
use raider_core::session::Session;
use raider_core::user::User;
use raider_plugin::registry::CustomPluginRegistry;
use raider_plugin::Plugin;
use std::sync::Arc;
use tracing::warn;

/// Either a literal or a plugin reference. Within maps, both keys and
/// values may be either literals or plugin references.
#[derive(Clone)]
pub enum Field {
    Literal(String),
    Plugin(Arc<Plugin>),
}

impl Field {
    async fn resolve(
        &self,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> Option<String> {
        match self {
            Field::Literal(s) => Some(s.clone()),
            Field::Plugin(p) => p.resolve_input(user, session, None, registry).await,
        }
    }
}

/// A request body: a form/map, a raw string, or literal JSON.
#[derive(Clone)]
pub enum Body {
    None,
    Form(Vec<(Field, Field)>),
    Raw(String),
    Json(serde_json::Value),
}

impl Default for Body {
    fn default() -> Self {
        Body::None
    }
}

/// Template for one HTTP exchange.
#[derive(Clone)]
pub struct Request {
    pub method: String,
    /// Absolute URL, if set, wins over `path`.
    pub url: Option<String>,
    /// Relative to the session's `base_url`.
    pub path: Option<String>,
    pub cookies: Vec<Arc<Plugin>>,
    pub headers: Vec<Arc<Plugin>>,
    pub body: Body,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: None,
            path: None,
            cookies: Vec::new(),
            headers: Vec::new(),
            body: Body::None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_cookie(mut self, plugin: Arc<Plugin>) -> Self {
        self.cookies.push(plugin);
        self
    }

    pub fn with_header(mut self, plugin: Arc<Plugin>) -> Self {
        self.headers.push(plugin);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Lower this template to a concrete outbound call.
    pub async fn materialise(
        &self,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> HttpRequestSpec {
        let url = self.resolve_url(session);
        let (host, path) = host_and_path(&url);

        let mut headers = Vec::new();
        for plugin in &self.headers {
            let Some(name) = plugin.header_name() else {
                warn!(plugin = %plugin.name, "header plugin has no header name");
                continue;
            };
            match plugin.resolve_input(user, session, None, registry).await {
                Some(value) => headers.push((name.to_string(), value)),
                None => warn!(plugin = %plugin.name, header = %name, "unresolved header plugin, omitted"),
            }
        }

        let mut cookie_pairs = Vec::new();
        for plugin in &self.cookies {
            let Some(name) = plugin.cookie_name() else {
                warn!(plugin = %plugin.name, "cookie plugin has no cookie name");
                continue;
            };
            match plugin.resolve_input(user, session, None, registry).await {
                Some(value) => cookie_pairs.push(format!("{name}={value}")),
                None => warn!(plugin = %plugin.name, cookie = %name, "unresolved cookie plugin, omitted"),
            }
        }
        if let Some(jar_header) = session.cookies.header_for(&host, &path) {
            cookie_pairs.push(jar_header);
        }
        let cookie_header = if cookie_pairs.is_empty() {
            None
        } else {
            Some(cookie_pairs.join("; "))
        };

        let body = self.materialise_body(user, session, registry).await;

        HttpRequestSpec {
            method: self.method.clone(),
            url,
            headers,
            cookie_header,
            body,
        }
    }

    fn resolve_url(&self, session: &Session) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        let path = self.path.clone().unwrap_or_default();
        match &session.base_url {
            Some(base) => join_base_and_path(base, &path),
            None => path,
        }
    }

    async fn materialise_body(
        &self,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> Option<Vec<u8>> {
        match &self.body {
            Body::None => None,
            Body::Raw(s) => Some(s.clone().into_bytes()),
            Body::Json(value) => Some(value.to_string().into_bytes()),
            Body::Form(pairs) => {
                let mut entries = Vec::new();
                for (key_field, value_field) in pairs {
                    let key = key_field.resolve(user, session, registry).await;
                    let value = value_field.resolve(user, session, registry).await;
                    match (key, value) {
                        (Some(k), Some(v)) => entries.push(format!(
                            "{}={}",
                            urlencode(&k),
                            urlencode(&v)
                        )),
                        _ => {
                            // A plugin key or value that resolved to absent: the
                            // entry is omitted entirely (see DESIGN.md #3).
                            warn!("body field unresolved, entry omitted");
                        }
                    }
                }
                Some(entries.join("&").into_bytes())
            }
        }
    }
}

fn join_base_and_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn host_and_path(url: &str) -> (String, String) {
    match url::Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_string(),
            parsed.path().to_string(),
        ),
        Err(_) => (String::new(), url.to_string()),
    }
}

fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
