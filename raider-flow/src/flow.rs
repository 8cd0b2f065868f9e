use crate::operation::{evaluate, Operation, Verdict};
use crate::request::Request;
use crate::response::bind_outputs;
use raider_core::error::RaiderError;
use raider_core::session::Session;
use raider_core::user::User;
use raider_plugin::registry::CustomPluginRegistry;
use raider_plugin::Plugin;
use std::sync::Arc;

/// One named stage of an authentication or function graph: a request
/// template, the outputs it binds from the response, and the operations
/// it evaluates afterwards.
pub struct Flow {
    pub name: String,
    pub request: Request,
    pub outputs: Vec<Arc<Plugin>>,
    pub operations: Vec<Operation>,
}

impl Flow {
    pub fn new(name: impl Into<String>, request: Request) -> Self {
        Self {
            name: name.into(),
            request,
            outputs: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn with_output(mut self, plugin: Arc<Plugin>) -> Self {
        self.outputs.push(plugin);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Run one request/response exchange for this stage: materialise the
    /// request, send it, merge `Set-Cookie`s into the jar,
    /// bind outputs, then evaluate operations in order until one returns a
    /// terminal verdict (or the list runs dry, which is `Continue`).
    pub async fn run(
        &self,
        user: Option<&User>,
        session: &mut Session,
        registry: &CustomPluginRegistry,
    ) -> Result<Verdict, RaiderError> {
        let request_spec = self.request.materialise(user, session, registry).await;
        let (host, path) = request_spec
            .url
            .parse::<url::Url>()
            .map(|u| (u.host_str().unwrap_or_default().to_string(), u.path().to_string()))
            .unwrap_or_default();

        let response_spec = session.http_client().clone().send(request_spec).await?;

        session
            .cookies
            .merge_set_cookies(&host, &path, response_spec.set_cookies.iter().map(String::as_str));

        bind_outputs(&response_spec, &self.outputs, session, registry);

        for operation in &self.operations {
            let verdict = evaluate(operation, &response_spec, session)?;
            if verdict.is_terminal() {
                return Ok(verdict);
            }
        }
        Ok(Verdict::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raider_core::transport::TransportConfig;
    use raider_core::user::UserStore;
    use raider_plugin::PluginKind;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn run_binds_output_and_continues_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"username":"alice"}"#))
            .mount(&server)
            .await;

        let output = Plugin::new("username", PluginKind::Json { path: "username".into() });
        let flow = Flow::new("profile", Request::new("GET").with_url(format!("{}/profile", server.uri())))
            .with_output(output);

        let mut session =
            Session::new(TransportConfig::default(), UserStore::new(vec![])).unwrap();
        let registry = CustomPluginRegistry::new();
        let verdict = flow.run(None, &mut session, &registry).await.unwrap();
        assert_eq!(verdict, Verdict::Continue);
        assert_eq!(session.value_of("username"), Some("alice"));
    }

    #[tokio::test]
    async fn run_routes_to_next_stage_on_matching_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let flow = Flow::new("login", Request::new("POST").with_url(format!("{}/login", server.uri())))
            .with_operation(Operation::Http {
                status: 302,
                action: Box::new(Operation::NextStage(Some("multi_factor".into()))),
                otherwise: Some(Box::new(Operation::Error("unexpected status".into()))),
            });

        let mut session =
            Session::new(TransportConfig::default(), UserStore::new(vec![])).unwrap();
        let registry = CustomPluginRegistry::new();
        let verdict = flow.run(None, &mut session, &registry).await.unwrap();
        assert_eq!(verdict, Verdict::NextStage(Some("multi_factor".into())));
    }

    #[tokio::test]
    async fn run_merges_set_cookie_into_session_jar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "sid=abc123; Path=/"))
            .mount(&server)
            .await;

        let flow = Flow::new("index", Request::new("GET").with_url(server.uri()));
        let mut session =
            Session::new(TransportConfig::default(), UserStore::new(vec![])).unwrap();
        let registry = CustomPluginRegistry::new();
        flow.run(None, &mut session, &registry).await.unwrap();
        let host = url::Url::parse(&server.uri()).unwrap().host_str().unwrap().to_string();
        assert_eq!(session.cookies.get(&host, "/", "sid"), Some("abc123"));
    }
}
