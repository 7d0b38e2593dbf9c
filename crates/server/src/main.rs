//! Receptionist server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use receptionist_config::{load_settings, Settings};
use receptionist_core::{DialogueModel, SpeechSynthesizer};
use receptionist_llm::bind_model;
use receptionist_persistence::{PersistenceLayer, ScyllaConfig};
use receptionist_server::{create_router, AppState};
use receptionist_tts::TranslateTts;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("RECEPTIONIST_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = env.as_deref().unwrap_or("default"),
        "Starting receptionist server"
    );

    let persistence = init_persistence(&settings).await;
    let model = init_dialogue_model(&settings).await?;

    let speech = Arc::new(
        TranslateTts::new(Duration::from_secs(settings.speech.timeout_secs))
            .context("Failed to create speech backend")?,
    );
    tracing::info!(backend = speech.backend_name(), "Speech synthesizer ready");

    let port = settings.server.port;
    let state = AppState::new(settings, model, speech, persistence);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with env-filter and optional JSON output
fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &settings.observability.log_level;
        format!("receptionist={},tower_http=debug", level).into()
    });

    let fmt_layer = if settings.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Connect the persistence layer, falling back to in-memory stores
/// when ScyllaDB is disabled or unreachable.
async fn init_persistence(settings: &Settings) -> PersistenceLayer {
    if !settings.persistence.enabled {
        tracing::info!("Persistence disabled, using in-memory stores");
        return PersistenceLayer::in_memory();
    }

    let config = ScyllaConfig {
        hosts: settings.persistence.scylla_hosts.clone(),
        keyspace: settings.persistence.keyspace.clone(),
        replication_factor: settings.persistence.replication_factor,
    };
    let roster_ttl = Duration::from_secs(settings.persistence.roster_ttl_secs);

    match receptionist_persistence::init(config, roster_ttl).await {
        Ok(layer) => {
            tracing::info!(
                hosts = ?settings.persistence.scylla_hosts,
                keyspace = %settings.persistence.keyspace,
                "ScyllaDB persistence initialized"
            );
            layer
        }
        Err(e) => {
            tracing::error!("Failed to initialize ScyllaDB: {}. Falling back to in-memory.", e);
            PersistenceLayer::in_memory()
        }
    }
}

/// Bind the dialogue model from the preference list.
///
/// Without an API key the server starts degraded and both bindings
/// answer with the service-unavailable message. With a key, failing to
/// bind any preferred model is a startup error.
async fn init_dialogue_model(
    settings: &Settings,
) -> anyhow::Result<Option<Arc<dyn DialogueModel>>> {
    if settings.dialogue.api_key.is_empty() {
        tracing::warn!("No dialogue API key configured, sessions will be refused");
        return Ok(None);
    }

    let model = bind_model(&settings.dialogue)
        .await
        .context("No dialogue model from the preference list could be bound")?;

    tracing::info!(model = model.model_name(), "Dialogue model bound");
    Ok(Some(model))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
