use clap::Parser;
use cron::Schedule;
use futures::future::try_join_all;
use mmo_sandbox::cli::{Cli, Commands, ServiceName};
use mmo_sandbox::clients::DirectoryClient;
use mmo_sandbox::config::Config;
use mmo_sandbox::services::sweeper::{run_every, run_on_schedule, BackgroundTask, SessionSweeper};
use mmo_sandbox::{
    create_engine_app, create_mmo_app, create_proxy_app, create_token_app, startup, EngineState,
    MmoState, ProxyState, TokenState,
};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Config) => mmo_sandbox::cli::handle_config_validate(&config),
        Some(Commands::Serve { service }) => serve(config, service).await,
        None => serve(config, ServiceName::All).await,
    }
}

async fn serve(config: Config, service: ServiceName) -> anyhow::Result<()> {
    let report = startup::validate_environment(&config);
    if !report.is_valid() {
        report.print();
        anyhow::bail!("startup validation failed");
    }

    let mut servers = Vec::new();
    let mut background: Vec<BackgroundTask> = Vec::new();

    if service.includes(ServiceName::Token) {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.token_port));
        tracing::info!("token service listening on {}", addr);
        servers.push(
            axum::Server::try_bind(&addr)?
                .serve(create_token_app(TokenState::new()).into_make_service()),
        );
    }

    if service.includes(ServiceName::Mmo) {
        let state = MmoState::from_config(&config);

        let schedule = Schedule::from_str(&config.account_wipe_schedule)?;
        let directory = state.directory.clone();
        background.push(run_on_schedule(schedule, move || {
            let directory = directory.clone();
            async move {
                directory.wipe_accounts().await;
            }
        }));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.mmo_port));
        tracing::info!("mmo service listening on {}", addr);
        servers.push(
            axum::Server::try_bind(&addr)?.serve(create_mmo_app(state).into_make_service()),
        );
    }

    if service.includes(ServiceName::Engine) {
        let state = EngineState::from_config(&config);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.engine_port));
        tracing::info!("engine service listening on {}", addr);
        servers.push(
            axum::Server::try_bind(&addr)?.serve(create_engine_app(state).into_make_service()),
        );
    }

    if service.includes(ServiceName::Proxy) {
        let state = ProxyState::from_config(&config);

        let sweeper = SessionSweeper::new(
            state.sessions.clone(),
            DirectoryClient::new(config.mmo_url.clone()),
            Duration::from_secs(config.session_idle_secs),
        );
        background.push(run_every(
            Duration::from_secs(config.session_sweep_secs),
            move || {
                let sweeper = sweeper.clone();
                async move { sweeper.sweep().await }
            },
        ));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.proxy_port));
        tracing::info!("proxy service listening on {}", addr);
        servers.push(
            axum::Server::try_bind(&addr)?.serve(create_proxy_app(state).into_make_service()),
        );
    }

    try_join_all(servers).await?;

    for task in background {
        task.stop().await;
    }

    Ok(())
}
