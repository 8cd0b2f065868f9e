use crate::attr_match::AttrMatch;
use crate::flags::PluginFlags;
use crate::registry::CustomPluginRegistry;
use raider_core::http_client::HttpResponseSpec;
use raider_core::session::Session;
use raider_core::user::User;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

/// How an `Alter` plugin post-processes its inner value.
#[derive(Debug, Clone)]
pub enum AlterOp {
    Prefix(String),
    Suffix(String),
    Replace { from: String, to: String },
}

impl AlterOp {
    fn apply(&self, value: &str) -> String {
        match self {
            AlterOp::Prefix(p) => format!("{p}{value}"),
            AlterOp::Suffix(s) => format!("{value}{s}"),
            AlterOp::Replace { from, to } => value.replace(from.as_str(), to.as_str()),
        }
    }
}

/// Which part of a wrapped plugin's value `UrlParser` extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlComponent {
    Scheme,
    Host,
    Path,
    Query,
}

/// What an `Html` plugin extracts from its matched tag.
#[derive(Debug, Clone)]
pub enum HtmlExtract {
    Attribute(String),
    /// `extract="data"`: the tag's inner text.
    Data,
}

/// A `Header` plugin's resolution mode. Basic and bearer auth
/// constructors are folded into this variant rather than living as
/// separate top-level plugin kinds.
#[derive(Debug, Clone)]
pub enum HeaderMode {
    /// Plain named header: input emits `name: value`, output reads the
    /// response header with this name.
    Named(String),
    BasicAuth {
        header_name: String,
        username: Arc<Plugin>,
        password: Arc<Plugin>,
    },
    BearerAuth {
        header_name: String,
        token: Arc<Plugin>,
    },
}

/// The tagged variant every plugin is, rather than a trait object behind
/// a deep inheritance hierarchy.
#[derive(Clone)]
pub enum PluginKind {
    Variable {
        field: String,
    },
    Prompt {
        message: String,
    },
    Command {
        command: String,
    },
    Cookie {
        cookie_name: String,
    },
    Header {
        mode: HeaderMode,
    },
    Regex {
        pattern: Regex,
    },
    Html {
        tag: String,
        attributes: Vec<(String, AttrMatch)>,
        extract: HtmlExtract,
    },
    Json {
        path: String,
    },
    Empty {
        literal: Option<String>,
    },
    Alter {
        inner: Arc<Plugin>,
        op: AlterOp,
    },
    Combine {
        parts: Vec<Arc<Plugin>>,
    },
    UrlParser {
        inner: Arc<Plugin>,
        component: UrlComponent,
    },
    /// Escape hatch for user-supplied extractor functions.
    Custom {
        key: String,
    },
}

/// A named value carrier.
#[derive(Clone)]
pub struct Plugin {
    pub name: String,
    pub kind: PluginKind,
}

impl Plugin {
    pub fn new(name: impl Into<String>, kind: PluginKind) -> Arc<Plugin> {
        Arc::new(Plugin {
            name: name.into(),
            kind,
        })
    }

    pub fn flags(&self) -> PluginFlags {
        match &self.kind {
            PluginKind::Variable { .. } => PluginFlags::needs_userdata(),
            PluginKind::Prompt { .. } | PluginKind::Command { .. } => PluginFlags::NONE,
            PluginKind::Cookie { .. }
            | PluginKind::Regex { .. }
            | PluginKind::Html { .. }
            | PluginKind::Json { .. }
            | PluginKind::Empty { .. }
            | PluginKind::Custom { .. } => PluginFlags::needs_response(),
            PluginKind::Header { mode } => match mode {
                HeaderMode::Named(_) => PluginFlags::needs_response(),
                HeaderMode::BasicAuth { .. } | HeaderMode::BearerAuth { .. } => {
                    PluginFlags::depends_on_other_plugins()
                }
            },
            PluginKind::Alter { .. } | PluginKind::Combine { .. } | PluginKind::UrlParser { .. } => {
                PluginFlags::depends_on_other_plugins()
            }
        }
    }

    /// The literal header name this plugin contributes when used as a
    /// `Request` header reference. `None` for plugin kinds that never act
    /// as a header.
    pub fn header_name(&self) -> Option<&str> {
        match &self.kind {
            PluginKind::Header { mode } => Some(match mode {
                HeaderMode::Named(name) => name.as_str(),
                HeaderMode::BasicAuth { header_name, .. } => header_name.as_str(),
                HeaderMode::BearerAuth { header_name, .. } => header_name.as_str(),
            }),
            _ => None,
        }
    }

    /// The literal cookie name this plugin contributes when used as a
    /// `Request` cookie reference.
    pub fn cookie_name(&self) -> Option<&str> {
        match &self.kind {
            PluginKind::Cookie { cookie_name } => Some(cookie_name.as_str()),
            _ => None,
        }
    }

    /// Resolve this plugin's value for use as request input. `registry`
    /// supplies `Custom` extractors; it is allowed to be empty for graphs
    /// that never reference one.
    pub async fn resolve_input(
        &self,
        user: Option<&User>,
        session: &mut Session,
        response: Option<&HttpResponseSpec>,
        registry: &CustomPluginRegistry,
    ) -> Option<String> {
        match &self.kind {
            PluginKind::Variable { field } => {
                let Some(user) = user else {
                    warn!(plugin = %self.name, "Variable plugin has no active user");
                    return None;
                };
                let value = user.field(field);
                if value.is_none() {
                    warn!(plugin = %self.name, field = %field, "Variable field missing on active user");
                }
                value.map(str::to_string)
            }
            PluginKind::Prompt { message } => {
                if let Some(cached) = session.value_of(&self.name) {
                    return Some(cached.to_string());
                }
                let value = match rpassword::prompt_password(format!("{message}: ")) {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(plugin = %self.name, error = %e, "Failed to read prompt");
                        return None;
                    }
                };
                session.set_value(self.name.clone(), Some(value.clone()));
                Some(value)
            }
            PluginKind::Command { command } => run_command(command).await,
            PluginKind::Cookie { .. } | PluginKind::Regex { .. } | PluginKind::Json { .. } | PluginKind::Empty { .. } => {
                let cached = session.value_of(&self.name).map(str::to_string);
                if cached.is_none() {
                    if let PluginKind::Empty { literal } = &self.kind {
                        return literal.clone();
                    }
                }
                cached
            }
            PluginKind::Html { .. } => session.value_of(&self.name).map(str::to_string),
            PluginKind::Header { mode } => match mode {
                HeaderMode::Named(_) => session.value_of(&self.name).map(str::to_string),
                HeaderMode::BasicAuth { username, password, .. } => {
                    let user_val = Box::pin(username.resolve_input(user, session, response, registry)).await;
                    let pass_val = Box::pin(password.resolve_input(user, session, response, registry)).await;
                    match (user_val, pass_val) {
                        (Some(u), Some(p)) => {
                            use base64::Engine;
                            let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{u}:{p}"));
                            Some(format!("Basic {encoded}"))
                        }
                        _ => {
                            warn!(plugin = %self.name, "basicauth missing username or password");
                            None
                        }
                    }
                }
                HeaderMode::BearerAuth { token, .. } => {
                    let value = Box::pin(token.resolve_input(user, session, response, registry)).await;
                    value.map(|t| format!("Bearer {t}"))
                }
            },
            PluginKind::Alter { inner, op } => {
                let value = Box::pin(inner.resolve_input(user, session, response, registry)).await;
                value.map(|v| op.apply(&v))
            }
            PluginKind::Combine { parts } => {
                let mut resolved = Vec::with_capacity(parts.len());
                let mut any_present = false;
                for part in parts {
                    let value = Box::pin(part.resolve_input(user, session, response, registry)).await;
                    if value.is_some() {
                        any_present = true;
                    } else {
                        warn!(plugin = %self.name, part = %part.name, "Combine part unresolved, treated as empty");
                    }
                    resolved.push(value.unwrap_or_default());
                }
                if any_present {
                    Some(resolved.concat())
                } else {
                    None
                }
            }
            PluginKind::UrlParser { inner, component } => {
                let value = Box::pin(inner.resolve_input(user, session, response, registry)).await?;
                let parsed = url::Url::parse(&value).ok()?;
                Some(match component {
                    UrlComponent::Scheme => parsed.scheme().to_string(),
                    UrlComponent::Host => parsed.host_str().unwrap_or_default().to_string(),
                    UrlComponent::Path => parsed.path().to_string(),
                    UrlComponent::Query => parsed.query().unwrap_or_default().to_string(),
                })
            }
            PluginKind::Custom { .. } => session.value_of(&self.name).map(str::to_string),
        }
    }

    /// Extract this plugin's value from a response. Only meaningful for
    /// response-extractable kinds; returns `None` for
    /// anything else (the flow binder never calls this on a non-output
    /// plugin, but it is still total).
    pub fn extract_output(&self, response: &HttpResponseSpec, registry: &CustomPluginRegistry) -> Option<String> {
        match &self.kind {
            PluginKind::Cookie { cookie_name } => extract_cookie(response, cookie_name),
            PluginKind::Header { mode: HeaderMode::Named(header_name) } => {
                extract_header(response, header_name)
            }
            PluginKind::Regex { pattern } => {
                let body = String::from_utf8_lossy(&response.body);
                pattern
                    .captures(&body)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
            }
            PluginKind::Html { tag, attributes, extract } => extract_html(response, tag, attributes, extract),
            PluginKind::Json { path } => extract_json(response, path),
            PluginKind::Empty { .. } => None,
            PluginKind::Custom { key } => registry.get(key).and_then(|f| f(&response.body, &response.headers)),
            _ => None,
        }
    }
}

async fn run_command(command: &str) -> Option<String> {
    let output = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .await;
    match output {
        Ok(output) => {
            let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            while stdout.ends_with('\n') || stdout.ends_with('\r') {
                stdout.pop();
            }
            Some(stdout)
        }
        Err(e) => {
            warn!(command = %command, error = %e, "Command plugin failed to execute");
            None
        }
    }
}

fn extract_cookie(response: &HttpResponseSpec, name: &str) -> Option<String> {
    let mut found = None;
    for raw in &response.set_cookies {
        if let Ok(parsed) = cookie::Cookie::parse(raw.clone()) {
            if parsed.name() == name {
                found = Some(parsed.value().to_string());
            }
        }
    }
    found
}

fn extract_header(response: &HttpResponseSpec, name: &str) -> Option<String> {
    let mut found = None;
    for (header_name, value) in &response.headers {
        if header_name == name {
            found = Some(value.clone());
        }
    }
    found
}

fn extract_html(
    response: &HttpResponseSpec,
    tag: &str,
    attributes: &[(String, AttrMatch)],
    extract: &HtmlExtract,
) -> Option<String> {
    let body = String::from_utf8_lossy(&response.body);
    let document = scraper::Html::parse_document(&body);
    let selector = scraper::Selector::parse(tag).ok()?;

    for element in document.select(&selector) {
        let all_match = attributes.iter().all(|(attr_name, matcher)| {
            element
                .value()
                .attr(attr_name)
                .map(|v| matcher.matches(v))
                .unwrap_or(false)
        });
        if !all_match {
            continue;
        }
        return match extract {
            HtmlExtract::Attribute(attr_name) => element.value().attr(attr_name).map(str::to_string),
            HtmlExtract::Data => Some(element.text().collect::<String>()),
        };
    }
    None
}

fn extract_json(response: &HttpResponseSpec, path: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
    let mut current = &value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    match current {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
