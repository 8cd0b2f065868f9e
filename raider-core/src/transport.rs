use std::time::Duration;
use url::Url;

/// HTTP transport configuration shared by every request in a run:
/// optional upstream proxy URL, TLS verify toggle, user-agent.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub proxy: Option<Url>,
    pub verify_tls: bool,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            verify_tls: true,
            user_agent: format!("raider/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn with_proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_verify_tls() {
        let cfg = TransportConfig::default();
        assert!(cfg.verify_tls);
        assert!(cfg.proxy.is_none());
    }

    #[test]
    fn builder_sets_proxy() {
        let cfg = TransportConfig::default()
            .with_proxy(Url::parse("http://127.0.0.1:8080").unwrap())
            .with_verify_tls(false);
        assert_eq!(cfg.proxy.unwrap().as_str(), "http://127.0.0.1:8080/");
        assert!(!cfg.verify_tls);
    }
}
