use std::collections::HashMap;

/// A single user record: a freeform field→value map (username, password,
/// and whatever else a site's login needs), loaded by the front-end and
/// handed to the core as already-parsed data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    fields: HashMap<String, String>,
}

impl User {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field. `Variable` plugins read the active user through
    /// this accessor.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

impl From<HashMap<String, String>> for User {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

/// The project's user list plus the currently active selection.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Vec<User>,
    active: usize,
}

impl UserStore {
    pub fn new(users: Vec<User>) -> Self {
        Self { users, active: 0 }
    }

    /// The currently selected user, if any are loaded.
    pub fn active(&self) -> Option<&User> {
        self.users.get(self.active)
    }

    /// Select a different user by index. Out-of-range indices are left
    /// unapplied: the core does not validate the index beyond
    /// bounds-checking `active()`.
    pub fn select(&mut self, index: usize) {
        self.active = index;
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup() {
        let user = User::new()
            .with_field("username", "alice")
            .with_field("password", "hunter2");
        assert_eq!(user.field("username"), Some("alice"));
        assert_eq!(user.field("missing"), None);
    }

    #[test]
    fn active_user_defaults_to_first() {
        let store = UserStore::new(vec![
            User::new().with_field("username", "alice"),
            User::new().with_field("username", "bob"),
        ]);
        assert_eq!(store.active().unwrap().field("username"), Some("alice"));
    }

    #[test]
    fn select_changes_active_user() {
        let mut store = UserStore::new(vec![
            User::new().with_field("username", "alice"),
            User::new().with_field("username", "bob"),
        ]);
        store.select(1);
        assert_eq!(store.active().unwrap().field("username"), Some("bob"));
    }

    #[test]
    fn empty_store_has_no_active_user() {
        let store = UserStore::new(vec![]);
        assert!(store.active().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn out_of_range_select_leaves_no_active_user() {
        let mut store = UserStore::new(vec![User::new()]);
        store.select(5);
        assert!(store.active().is_none());
    }
}
