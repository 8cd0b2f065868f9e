use std::collections::HashMap;

/// Ordered list of authentication flows plus a set of non-authentication
/// "function" flows, with name→index maps built once at construction
/// rather than looked up by string on every stage transition.
///
/// Generic over the flow type so `raider-core` does not need to depend on
/// `raider-flow` (which depends back on `raider-core` for `Session`).
pub struct FlowGraph<F> {
    authentication: Vec<F>,
    functions: Vec<F>,
    auth_index: HashMap<String, usize>,
    function_index: HashMap<String, usize>,
}

impl<F> FlowGraph<F> {
    pub fn new(authentication: Vec<F>, functions: Vec<F>, name_of: impl Fn(&F) -> &str) -> Self {
        let auth_index = authentication
            .iter()
            .enumerate()
            .map(|(i, f)| (name_of(f).to_string(), i))
            .collect();
        let function_index = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (name_of(f).to_string(), i))
            .collect();
        Self {
            authentication,
            functions,
            auth_index,
            function_index,
        }
    }

    pub fn authentication(&self) -> &[F] {
        &self.authentication
    }

    pub fn functions(&self) -> &[F] {
        &self.functions
    }

    pub fn first_authentication_flow(&self) -> Option<&F> {
        self.authentication.first()
    }

    pub fn auth_flow_at(&self, index: usize) -> Option<&F> {
        self.authentication.get(index)
    }

    pub fn index_of_auth_flow(&self, name: &str) -> Option<usize> {
        self.auth_index.get(name).copied()
    }

    pub fn function_by_name(&self, name: &str) -> Option<&F> {
        self.function_index.get(name).and_then(|&i| self.functions.get(i))
    }
}
