//! Integration test for the embedded demo graph ("simple two-stage"
//! authentication), exercised in-process against a `wiremock` server
//! rather than by spawning the `raider` binary.

use raider_cli::demo_graph::{demo_graph, demo_user};
use raider_core::session::Session;
use raider_core::transport::TransportConfig;
use raider_flow::{AuthOutcome, AuthRunner};
use raider_plugin::registry::CustomPluginRegistry;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Demo graph smoke tests ───────────────────────────────────

#[tokio::test]
async fn demo_graph_authenticates_on_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "sid=abc123; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let graph = demo_graph(&server.uri());
    let users = demo_user();
    let user = users.active().cloned();

    let mut session = Session::new(TransportConfig::default(), users)
        .unwrap()
        .with_base_url(server.uri());
    let registry = CustomPluginRegistry::new();

    let outcome = AuthRunner::new().run(&graph, user.as_ref(), &mut session, &registry).await.unwrap();
    assert_eq!(outcome, AuthOutcome::Authenticated);
    assert_eq!(session.value_of("sid"), Some("abc123"));
}

#[tokio::test]
async fn demo_graph_fails_when_login_rejects_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let graph = demo_graph(&server.uri());
    let users = demo_user();
    let user = users.active().cloned();

    let mut session = Session::new(TransportConfig::default(), users)
        .unwrap()
        .with_base_url(server.uri());
    let registry = CustomPluginRegistry::new();

    let outcome = AuthRunner::new().run(&graph, user.as_ref(), &mut session, &registry).await.unwrap();
    assert_eq!(outcome, AuthOutcome::Failed("login failed".to_string()));
}
