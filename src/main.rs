use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

mod domain;
mod application;
mod infrastructure;

use application::context::AppContext;
use application::errors::BotError;
use application::services::MessageService;
use domain::traits::Bot;
use infrastructure::adapters::discord::{DiscordAdapter, GatewaySession};
use infrastructure::config::Config;
use infrastructure::github::GithubClient;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config_path = Config::path_from_env();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        "Loaded {} user commands from {}",
        config.user_commands.len(),
        config_path.display()
    );

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run_bot(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_bot(config: Config) -> Result<(), BotError> {
    let github = Arc::new(GithubClient::new()?);
    let context = Arc::new(AppContext::new(&config, github));
    let bot = DiscordAdapter::new(&config.token);

    run_until(bot, context, shutdown_signal()).await
}

/// Serve messages until `shutdown` completes or the gateway fails,
/// then close the session with a normal close frame
async fn run_until<F>(mut bot: DiscordAdapter, context: Arc<AppContext>, shutdown: F) -> Result<(), BotError>
where
    F: Future<Output = ()>,
{
    let mut session = bot.connect().await?;
    tracing::info!("Bot started: @{}", bot.bot_info().username);

    let service = Arc::new(MessageService::new(Arc::new(bot), context));
    tracing::info!("ntfybot running. Press Ctrl-C to exit.");

    let result = tokio::select! {
        result = run_message_loop(&mut session, service) => result,
        _ = shutdown => Ok(()),
    };

    session.close().await;
    tracing::info!("Gateway connection closed");
    result
}

async fn run_message_loop(
    session: &mut GatewaySession,
    service: Arc<MessageService<DiscordAdapter>>,
) -> Result<(), BotError> {
    loop {
        let message = session.next_message().await?;
        let service = service.clone();
        tokio::spawn(async move {
            service.respond(&message).await;
        });
    }
}

/// Waits for Ctrl-C or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Received Ctrl-C, shutting down");
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C, shutting down"),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received Ctrl-C, shutting down");
    }
}
