mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = xopt_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = xopt_db::connect_pool_from_config(&config).await?;
    let applied = xopt_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations up to date");

    let library = xopt_core::load_library(&config.library_path)?;
    let seeded = xopt_db::seed_library(&pool, &library).await?;
    tracing::info!(
        hooks = seeded.hooks,
        templates = seeded.templates,
        "system library seeded"
    );

    let generator = match xopt_generate::GeneratorConfig::from_app_config(&config) {
        Some(generator_config) => {
            tracing::info!(model = %generator_config.model, "generator enabled");
            Some(Arc::new(xopt_generate::GeneratorClient::new(
                &generator_config,
            )?))
        }
        None => {
            tracing::warn!("ANTHROPIC_API_KEY not set; generation endpoints will return 503");
            None
        }
    };

    let auth = AuthState::from_env(matches!(config.env, xopt_core::Environment::Development))?;
    let app = build_app(AppState { pool, generator }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "xopt-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
