use crate::flow::Flow;
use crate::operation::Verdict;
use raider_core::error::RaiderError;
use raider_core::graph::FlowGraph;
use raider_core::session::Session;
use raider_core::user::User;
use raider_plugin::registry::CustomPluginRegistry;
use tracing::info;

/// Default cap on authentication steps before giving up (see DESIGN.md):
/// enough for any reasonable multi-factor chain without letting a
/// misconfigured graph spin forever.
pub const DEFAULT_LOOP_GUARD: usize = 25;

#[derive(Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated,
    Failed(String),
}

/// Drives an authentication graph stage by stage.
pub struct AuthRunner {
    loop_guard: usize,
}

impl Default for AuthRunner {
    fn default() -> Self {
        Self { loop_guard: DEFAULT_LOOP_GUARD }
    }
}

impl AuthRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loop_guard(mut self, loop_guard: usize) -> Self {
        self.loop_guard = loop_guard;
        self
    }

    /// Run the authentication graph to completion. A `Continue` verdict
    /// advances to the next authentication flow in declaration order; a
    /// named `NextStage` jumps there directly. When the named stage is not
    /// found among authentication flows, function flows are checked too
    /// (DESIGN.md open question: "NextStage may target function flows") —
    /// only when neither list has it does the run fail with
    /// `RaiderError::UnknownStage`.
    pub async fn run(
        &self,
        graph: &FlowGraph<Flow>,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> Result<AuthOutcome, RaiderError> {
        let Some(mut current) = graph.first_authentication_flow() else {
            return Ok(AuthOutcome::Authenticated);
        };
        let mut steps = 0usize;

        loop {
            steps += 1;
            if steps > self.loop_guard {
                return Err(RaiderError::LoopGuard(self.loop_guard));
            }

            info!(flow = %current.name, step = steps, "running authentication flow");
            match current.run(user, session, registry).await? {
                Verdict::Continue => {
                    let next_index = graph.index_of_auth_flow(&current.name).map(|i| i + 1);
                    match next_index.and_then(|i| graph.auth_flow_at(i)) {
                        Some(next) => current = next,
                        None => return Ok(AuthOutcome::Authenticated),
                    }
                }
                Verdict::NextStage(None) => return Ok(AuthOutcome::Authenticated),
                Verdict::NextStage(Some(name)) => {
                    if let Some(index) = graph.index_of_auth_flow(&name) {
                        current = graph.auth_flow_at(index).expect("index_of_auth_flow returned a valid index");
                    } else if let Some(function_flow) = graph.function_by_name(&name) {
                        current = function_flow;
                    } else {
                        return Err(RaiderError::UnknownStage(name));
                    }
                }
                Verdict::Error(message) => return Ok(AuthOutcome::Failed(message)),
            }
        }
    }
}

/// Runs a single named function flow, independent of the authentication
/// graph's current stage.
pub struct FunctionRunner;

impl FunctionRunner {
    pub async fn run(
        graph: &FlowGraph<Flow>,
        name: &str,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> Result<Verdict, RaiderError> {
        let flow = graph
            .function_by_name(name)
            .ok_or_else(|| RaiderError::UnknownStage(name.to_string()))?;
        flow.run(user, session, registry).await
    }
}
