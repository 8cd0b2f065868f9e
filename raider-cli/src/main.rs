// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Raider — web authentication flow driver
//
//  This binary is intentionally thin: it owns argument parsing, logging
//  setup, and exit-code mapping. Graph
//  construction (the configuration-language front-end), credential
//  storage, and session persistence wiring are collaborators the core
//  only specifies contracts for; this binary supplies minimal concrete
//  defaults so the workspace is runnable end to end.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use raider_cli::config::CliConfig;
use raider_cli::demo_graph;
use raider_core::persistence::{FileSessionStore, SessionStore};
use raider_core::session::Session;
use raider_core::transport::TransportConfig;
use raider_flow::{AuthOutcome, AuthRunner, FunctionRunner};
use raider_plugin::registry::CustomPluginRegistry;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "raider", version, about = "Raider — a framework for testing web authentication")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL the demo graph's requests are relative to.
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Upstream proxy URL for the HTTP transport.
    #[arg(long)]
    proxy: Option<String>,

    /// Override the User-Agent header sent on every request.
    #[arg(long)]
    user_agent: Option<String>,

    /// Index into the loaded user list to use as the active user.
    #[arg(long, default_value_t = 0)]
    user: usize,

    /// Directory persisted session state (cookie jar + plugin store) is
    /// dumped to and reloaded from.
    #[arg(long, default_value = "./raider-state")]
    state_dir: PathBuf,

    /// Maximum authentication steps before the loop guard trips.
    #[arg(long, default_value_t = raider_flow::DEFAULT_LOOP_GUARD)]
    max_steps: usize,

    /// Log level (overridden by RUST_LOG if set).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the authentication graph from its start stage.
    Authenticate,
    /// Run a single named non-authentication flow.
    RunFunction {
        /// The function flow's name.
        name: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    let cfg = CliConfig::load()?.with_cli_overrides(cli.proxy.clone(), cli.user_agent.clone());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let exit_code = runtime.block_on(run(cli, cfg));
    std::process::exit(exit_code);
}

async fn run(cli: Cli, cfg: CliConfig) -> i32 {
    let mut transport = TransportConfig::default();
    if let Some(proxy) = &cfg.proxy {
        match url::Url::parse(proxy) {
            Ok(url) => transport = transport.with_proxy(url),
            Err(e) => {
                error!(error = %e, "invalid proxy URL");
                return 1;
            }
        }
    }
    if let Some(user_agent) = cfg.user_agent {
        transport.user_agent = user_agent;
    }

    let mut users = demo_graph::demo_user();
    users.select(cli.user);

    let mut session = match Session::new(transport, users) {
        Ok(session) => session.with_base_url(cli.base_url.clone()),
        Err(e) => {
            error!(error = %e, "failed to build session");
            return 1;
        }
    };

    let store = FileSessionStore::new(&cli.state_dir);
    match store.load() {
        Ok(persisted) => persisted.apply_to(&mut session),
        Err(e) => info!(error = %e, "no prior session state to restore"),
    }

    let graph = demo_graph::demo_graph(&cli.base_url);
    let registry = CustomPluginRegistry::new();
    let user = session.users.active().cloned();

    let result = match cli.command {
        Command::Authenticate => {
            let runner = AuthRunner::new().with_loop_guard(cli.max_steps);
            runner.run(&graph, user.as_ref(), &mut session, &registry).await.map(|outcome| match outcome {
                AuthOutcome::Authenticated => Ok(()),
                AuthOutcome::Failed(message) => Err(raider_core::error::RaiderError::Aborted(message)),
            })
        }
        Command::RunFunction { name } => FunctionRunner::run(&graph, &name, user.as_ref(), &mut session, &registry)
            .await
            .map(|_| Ok(())),
    };

    if let Err(e) = store.dump(&session) {
        error!(error = %e, "failed to persist session state");
    }

    match result {
        Ok(Ok(())) => {
            info!("authentication complete");
            0
        }
        Ok(Err(e)) => {
            error!(error = %e, "authentication failed");
            e.exit_code()
        }
        Err(e) => {
            error!(error = %e, "authentication aborted");
            e.exit_code()
        }
    }
}
