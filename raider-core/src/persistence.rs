use crate::cookie_jar::CookieJar;
use crate::error::RaiderError;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The on-disk shape of one project's persisted state: one cookie jar
/// file, one plugin-value store file, per project. `Vec<(...)>` rather
/// than `HashMap` so JSON serialisation is deterministic and round-trips
/// byte-for-byte.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedSession {
    pub cookies: Vec<(String, String, String, String)>,
    pub plugin_store: Vec<(String, String)>,
}

impl PersistedSession {
    pub fn from_session(session: &Session) -> Self {
        Self {
            cookies: session.cookies.to_sorted_pairs(),
            plugin_store: session.store_snapshot(),
        }
    }

    pub fn apply_to(&self, session: &mut Session) {
        session.cookies = CookieJar::from_sorted_pairs(self.cookies.clone());
        session.restore_store(self.plugin_store.clone());
    }
}

/// Dump/reload contract: the format is implementation-defined but
/// reload-then-dump MUST equal dump.
pub trait SessionStore {
    fn dump(&self, session: &Session) -> Result<(), RaiderError>;
    fn load(&self) -> Result<PersistedSession, RaiderError>;
}

/// Default `SessionStore`: one directory per project, JSON files via
/// `serde_json`.
pub struct FileSessionStore {
    project_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    fn cookies_path(&self) -> PathBuf {
        self.project_dir.join("cookies.json")
    }

    fn plugin_store_path(&self) -> PathBuf {
        self.project_dir.join("plugin_store.json")
    }
}

impl SessionStore for FileSessionStore {
    fn dump(&self, session: &Session) -> Result<(), RaiderError> {
        std::fs::create_dir_all(&self.project_dir)?;
        let persisted = PersistedSession::from_session(session);
        write_json(&self.cookies_path(), &persisted.cookies)?;
        write_json(&self.plugin_store_path(), &persisted.plugin_store)?;
        Ok(())
    }

    fn load(&self) -> Result<PersistedSession, RaiderError> {
        let cookies = read_json_or_default(&self.cookies_path())?;
        let plugin_store = read_json_or_default(&self.plugin_store_path())?;
        Ok(PersistedSession {
            cookies,
            plugin_store,
        })
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), RaiderError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn read_json_or_default<T>(path: &Path) -> Result<T, RaiderError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
