mod service_http;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use {
    adjutant_gateway::{AppState, BotRegistry, build_app, serve},
    adjutant_store::ConfigStore,
    anyhow::Context,
    clap::Parser,
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::service_http::HttpConversationService;

#[derive(Parser)]
#[command(name = "adjutant", about = "Conversation bot gateway for JIRA, GitLab and Pushover")]
struct Cli {
    /// Address to bind the intake listener to.
    #[arg(long, default_value = "0.0.0.0", env = "ADJUTANT_BIND")]
    bind: String,

    /// Listen port; also the port advertised in generated webhook URLs.
    #[arg(long, default_value_t = 8443, env = "ADJUTANT_PORT")]
    port: u16,

    /// Base URL of the conversation service.
    #[arg(long, env = "ADJUTANT_SERVICE_URL")]
    service_url: String,

    /// Bearer token for the conversation service, if it requires one.
    #[arg(long, env = "ADJUTANT_SERVICE_TOKEN")]
    service_token: Option<String>,

    /// Directory holding per-bot configuration records.
    #[arg(long, env = "ADJUTANT_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn store_root(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &cli.store_dir {
        return Ok(dir.clone());
    }
    let dirs = directories::ProjectDirs::from("", "", "adjutant")
        .context("no home directory; pass --store-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "adjutant starting");

    let root = store_root(&cli)?;
    info!(store = %root.display(), "using configuration store");
    let store = Arc::new(ConfigStore::new(root));

    let service = Arc::new(HttpConversationService::new(
        cli.service_url.clone(),
        cli.service_token.clone().map(Secret::new),
    ));
    let registry = Arc::new(BotRegistry::new(service, store.clone(), cli.port));
    let app = build_app(AppState { registry, store });

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cli.bind, cli.port))?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            trigger.cancel();
        }
    });

    serve(app, addr, shutdown).await?;
    info!("adjutant stopped");
    Ok(())
}
