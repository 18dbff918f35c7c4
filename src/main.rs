use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autorelease_bot::config::ServiceConfig;
use autorelease_bot::github::build_octocrab;
use autorelease_bot::server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autorelease_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::from_env().context("loading configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    let github = build_octocrab(config.github_token.clone(), config.github_api_url.as_deref())
        .context("building GitHub client")?;
    let state = AppState::new(config.webhook_secret.clone(), github, config.releaser());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!("listening on {}", config.listen_addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
