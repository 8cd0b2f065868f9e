use std::collections::HashMap;
use std::sync::Arc;

/// A user-supplied extractor: given the response body and headers, return
/// an extracted value. The escape hatch for custom plugins that plug in
/// via a registered extractor function rather than a built-in kind.
pub type CustomExtractor = Arc<dyn Fn(&[u8], &[(String, String)]) -> Option<String> + Send + Sync>;

/// Registry of custom extractor functions, keyed by the name a `Custom`
/// plugin references. A custom Raider plugin is "one function", not a
/// multi-phase trait object, so registration is a plain closure rather
/// than a boxed trait.
#[derive(Default, Clone)]
pub struct CustomPluginRegistry {
    extractors: HashMap<String, CustomExtractor>,
}

impl CustomPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, extractor: CustomExtractor) {
        self.extractors.insert(key.into(), extractor);
    }

    pub fn get(&self, key: &str) -> Option<&CustomExtractor> {
        self.extractors.get(key)
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_invoke_custom_extractor() {
        let mut registry = CustomPluginRegistry::new();
        registry.register(
            "upper-body",
            Arc::new(|body: &[u8], _headers: &[(String, String)]| {
                Some(String::from_utf8_lossy(body).to_uppercase())
            }),
        );

        let extractor = registry.get("upper-body").unwrap();
        assert_eq!(extractor(b"hi", &[]), Some("HI".to_string()));
    }

    #[test]
    fn unknown_key_returns_none() {
        let registry = CustomPluginRegistry::new();
        assert!(registry.get("missing").is_none());
    }
}
