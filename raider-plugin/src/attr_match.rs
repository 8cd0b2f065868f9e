use regex::Regex;

/// Normalised attribute predicate for the `Html` plugin. An attribute
/// match is either a literal string or a compiled regex, decided once
/// at construction rather than re-parsed on every match.
#[derive(Debug, Clone)]
pub enum AttrMatch {
    Exact(String),
    Regex(Regex),
}

impl AttrMatch {
    pub fn exact(value: impl Into<String>) -> Self {
        AttrMatch::Exact(value.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(AttrMatch::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            AttrMatch::Exact(expected) => expected == candidate,
            AttrMatch::Regex(re) => re.is_match(candidate),
        }
    }
}
