mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use adlens_gemini::GeminiClient;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = adlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = adlens_db::PoolConfig::from_app_config(&config);
    let pool = adlens_db::connect_pool(&config.database_url, pool_config).await?;
    adlens_db::run_migrations(&pool).await?;

    let gemini = build_gemini_client(&config)?;
    let auth = AuthState::from_env(matches!(
        config.env,
        adlens_core::Environment::Development
    ))?;

    let app = build_app(
        AppState {
            pool,
            gemini,
            research_max_concurrent: config.research_max_concurrent,
        },
        auth,
        default_rate_limit_state(),
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_gemini_client(
    config: &adlens_core::AppConfig,
) -> anyhow::Result<Option<Arc<GeminiClient>>> {
    let Some(api_key) = config.gemini_api_key.as_deref() else {
        tracing::warn!(
            "GEMINI_API_KEY not set; research, recommendation and creative endpoints will answer 503"
        );
        return Ok(None);
    };

    let client = match config.gemini_base_url.as_deref() {
        Some(base_url) => GeminiClient::with_base_url(api_key, config.gemini_timeout_secs, base_url)?,
        None => GeminiClient::new(api_key, config.gemini_timeout_secs)?,
    }
    .with_model(&config.gemini_model)
    .with_image_model(&config.image_model);

    Ok(Some(Arc::new(client)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
