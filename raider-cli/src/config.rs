use figment::providers::Env;
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Ambient transport knobs for `raider-cli`: CLI flags take precedence,
/// `RAIDER_`-prefixed environment variables fill in anything left unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

impl CliConfig {
    pub fn load() -> anyhow::Result<Self> {
        let figment = Figment::new().merge(Env::prefixed("RAIDER_"));
        Ok(figment.extract()?)
    }

    pub fn with_cli_overrides(mut self, proxy: Option<String>, user_agent: Option<String>) -> Self {
        if proxy.is_some() {
            self.proxy = proxy;
        }
        if user_agent.is_some() {
            self.user_agent = user_agent;
        }
        self
    }
}
