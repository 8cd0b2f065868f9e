use raider_core::error::RaiderError;
use raider_core::http_client::HttpResponseSpec;
use raider_core::session::Session;
use raider_plugin::Plugin;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Terminal result of evaluating a flow's operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    /// `None` means "stop authentication normally".
    NextStage(Option<String>),
    Error(String),
}

impl Verdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Verdict::Continue)
    }
}

/// Something `Print`/`Save` can render: a literal or an already-resolved
/// plugin value. Operations run after output binding, so plugin values
/// come straight from the session's plugin-value store.
#[derive(Clone)]
pub enum PrintItem {
    Literal(String),
    Plugin(Arc<Plugin>),
}

impl PrintItem {
    fn render(&self, session: &Session) -> String {
        match self {
            PrintItem::Literal(s) => s.clone(),
            PrintItem::Plugin(p) => session.value_of(&p.name).unwrap_or_default().to_string(),
        }
    }
}

/// What a `Save` operation writes.
#[derive(Clone)]
pub enum SaveSource {
    Plugin(Arc<Plugin>),
    Body,
}

/// Post-response action attached to a flow.
#[derive(Clone)]
pub enum Operation {
    NextStage(Option<String>),
    Print(Vec<PrintItem>),
    PrintBody,
    /// `Print.headers[name?]`: a specific header, or all of them.
    PrintHeaders(Option<String>),
    /// `Print.cookies[name?]`: a specific cookie, or all of them.
    PrintCookies(Option<String>),
    Save {
        path: String,
        source: SaveSource,
        append: bool,
    },
    Error(String),
    Http {
        status: u16,
        action: Box<Operation>,
        otherwise: Option<Box<Operation>>,
    },
    Grep {
        pattern: Regex,
        action: Box<Operation>,
        otherwise: Option<Box<Operation>>,
    },
    /// A list of operations evaluated in order, short-circuiting on the
    /// first terminal verdict. The action/otherwise of `Http`/`Grep` is
    /// itself an operation, which may in turn be a `Sequence`.
    Sequence(Vec<Operation>),
}

/// Evaluate one operation against the just-received response. Recursion
/// through `Http`/`Grep`/`Sequence` is plain function recursion —
/// no async boundary is needed here since operations only read already-
/// bound plugin values and the response already in hand.
pub fn evaluate(
    operation: &Operation,
    response: &HttpResponseSpec,
    session: &mut Session,
) -> Result<Verdict, RaiderError> {
    match operation {
        Operation::NextStage(name) => Ok(Verdict::NextStage(name.clone())),
        Operation::Error(message) => Ok(Verdict::Error(message.clone())),
        Operation::Print(items) => {
            for item in items {
                println!("{}", item.render(session));
            }
            Ok(Verdict::Continue)
        }
        Operation::PrintBody => {
            println!("{}", String::from_utf8_lossy(&response.body));
            Ok(Verdict::Continue)
        }
        Operation::PrintHeaders(name) => {
            for (header_name, value) in &response.headers {
                match name {
                    Some(n) if n == header_name => println!("{value}"),
                    None => println!("{header_name}: {value}"),
                    _ => {}
                }
            }
            Ok(Verdict::Continue)
        }
        Operation::PrintCookies(name) => {
            for raw in &response.set_cookies {
                if let Ok(parsed) = cookie::Cookie::parse(raw.clone()) {
                    match name {
                        Some(n) if n == parsed.name() => println!("{}", parsed.value()),
                        None => println!("{}={}", parsed.name(), parsed.value()),
                        _ => {}
                    }
                }
            }
            Ok(Verdict::Continue)
        }
        Operation::Save { path, source, append } => {
            let data = match source {
                SaveSource::Body => response.body.clone(),
                SaveSource::Plugin(plugin) => session
                    .value_of(&plugin.name)
                    .unwrap_or_default()
                    .as_bytes()
                    .to_vec(),
            };
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(*append)
                .truncate(!*append)
                .open(path)?;
            file.write_all(&data)?;
            info!(path = %path, "Saved output");
            Ok(Verdict::Continue)
        }
        Operation::Http { status, action, otherwise } => {
            if response.status == *status {
                evaluate(action, response, session)
            } else if let Some(otherwise) = otherwise {
                evaluate(otherwise, response, session)
            } else {
                Ok(Verdict::Continue)
            }
        }
        Operation::Grep { pattern, action, otherwise } => {
            let body = String::from_utf8_lossy(&response.body);
            if pattern.is_match(&body) {
                evaluate(action, response, session)
            } else if let Some(otherwise) = otherwise {
                evaluate(otherwise, response, session)
            } else {
                Ok(Verdict::Continue)
            }
        }
        Operation::Sequence(ops) => {
            for op in ops {
                let verdict = evaluate(op, response, session)?;
                if verdict.is_terminal() {
                    return Ok(verdict);
                }
            }
            Ok(Verdict::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raider_core::transport::TransportConfig;
    use raider_core::user::UserStore;

    fn session() -> Session {
        Session::new(TransportConfig::default(), UserStore::new(vec![])).unwrap()
    }

    fn response(status: u16, body: &str) -> HttpResponseSpec {
        HttpResponseSpec {
            status,
            headers: vec![],
            set_cookies: vec![],
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn next_stage_is_terminal() {
        let mut sess = session();
        let verdict = evaluate(&Operation::NextStage(Some("login".into())), &response(200, ""), &mut sess).unwrap();
        assert_eq!(verdict, Verdict::NextStage(Some("login".into())));
    }

    #[test]
    fn next_stage_none_means_stop() {
        let mut sess = session();
        let verdict = evaluate(&Operation::NextStage(None), &response(200, ""), &mut sess).unwrap();
        assert_eq!(verdict, Verdict::NextStage(None));
    }

    #[test]
    fn http_picks_action_on_matching_status() {
        let op = Operation::Http {
            status: 200,
            action: Box::new(Operation::NextStage(None)),
            otherwise: Some(Box::new(Operation::Error("bad".into()))),
        };
        let mut sess = session();
        assert_eq!(evaluate(&op, &response(200, ""), &mut sess).unwrap(), Verdict::NextStage(None));
        assert_eq!(
            evaluate(&op, &response(500, ""), &mut sess).unwrap(),
            Verdict::Error("bad".into())
        );
    }

    #[test]
    fn http_with_no_otherwise_continues_on_mismatch() {
        let op = Operation::Http { status: 200, action: Box::new(Operation::NextStage(None)), otherwise: None };
        let mut sess = session();
        assert_eq!(evaluate(&op, &response(404, ""), &mut sess).unwrap(), Verdict::Continue);
    }

    #[test]
    fn grep_routes_on_body_match() {
        let op = Operation::Grep {
            pattern: Regex::new("TWO_FA_REQUIRED").unwrap(),
            action: Box::new(Operation::NextStage(Some("multi_factor".into()))),
            otherwise: Some(Box::new(Operation::NextStage(Some("done".into())))),
        };
        let mut sess = session();
        assert_eq!(
            evaluate(&op, &response(200, "TWO_FA_REQUIRED"), &mut sess).unwrap(),
            Verdict::NextStage(Some("multi_factor".into()))
        );
        assert_eq!(
            evaluate(&op, &response(200, "ok"), &mut sess).unwrap(),
            Verdict::NextStage(Some("done".into()))
        );
    }

    #[test]
    fn sequence_short_circuits_on_first_terminal_verdict() {
        let op = Operation::Sequence(vec![
            Operation::Print(vec![PrintItem::Literal("first".into())]),
            Operation::NextStage(Some("stage-a".into())),
            Operation::NextStage(Some("stage-b".into())),
        ]);
        let mut sess = session();
        let verdict = evaluate(&op, &response(200, ""), &mut sess).unwrap();
        assert_eq!(verdict, Verdict::NextStage(Some("stage-a".into())));
    }

    #[test]
    fn operation_list_ending_without_verdict_is_continue() {
        let op = Operation::Sequence(vec![Operation::Print(vec![PrintItem::Literal("x".into())])]);
        let mut sess = session();
        assert_eq!(evaluate(&op, &response(200, ""), &mut sess).unwrap(), Verdict::Continue);
    }

    #[test]
    fn save_writes_plugin_value_to_disk() {
        let plugin = Plugin::new("token", raider_plugin::PluginKind::Empty { literal: None });
        let mut sess = session();
        sess.set_value("token", Some("secret".into()));
        let path = std::env::temp_dir().join(format!("raider-save-test-{}", std::process::id()));
        let op = Operation::Save { path: path.to_string_lossy().into_owned(), source: SaveSource::Plugin(plugin), append: false };
        evaluate(&op, &response(200, ""), &mut sess).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "secret");
        let _ = std::fs::remove_file(path);
    }
}
