//! A small, hard-coded authentication graph used for this binary's own
//! smoke tests and manual testing. The configuration-language front-end
//! that would normally build an `AuthGraph` from an operator's site
//! description lives outside this crate — this module stands in for it
//! with a literal two-stage login scenario, so `raider authenticate` has
//! something runnable without a front-end attached.

use raider_core::graph::FlowGraph;
use raider_core::user::{User, UserStore};
use raider_flow::{Body, Field, Flow, Operation, Request};
use raider_plugin::{Plugin, PluginKind};

pub fn demo_graph(base_url: &str) -> FlowGraph<Flow> {
    let username = Plugin::new("username", PluginKind::Variable { field: "username".into() });
    let password = Plugin::new("password", PluginKind::Variable { field: "password".into() });
    let sid = Plugin::new("sid", PluginKind::Cookie { cookie_name: "sid".into() });

    let init = Flow::new("initialization", Request::new("GET").with_url(format!("{base_url}/login")))
        .with_output(sid.clone())
        .with_operation(Operation::NextStage(Some("login".into())));

    let login = Flow::new(
        "login",
        Request::new("POST")
            .with_url(format!("{base_url}/login"))
            .with_cookie(sid.clone())
            .with_body(Body::Form(vec![
                (Field::Literal("username".into()), Field::Plugin(username)),
                (Field::Literal("password".into()), Field::Plugin(password)),
            ])),
    )
    .with_operation(Operation::Http {
        status: 200,
        action: Box::new(Operation::NextStage(None)),
        otherwise: Some(Box::new(Operation::Error("login failed".into()))),
    });

    FlowGraph::new(vec![init, login], vec![], |f: &Flow| f.name.as_str())
}

pub fn demo_user() -> UserStore {
    UserStore::new(vec![User::new().with_field("username", "alice").with_field("password", "hunter2")])
}
