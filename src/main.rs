use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use satrent::config::AppConfig;
use satrent::db;
use satrent::handlers;
use satrent::services::notify::emailjs::EmailJsNotifier;
use satrent::services::notify::{LogNotifier, Notifier};
use satrent::services::storage::local::LocalFileStore;
use satrent::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is not set; using the default token");
    }

    let conn = db::init_db_with_busy_timeout(
        &config.database_url,
        Duration::from_millis(config.db_busy_timeout_ms),
    )?;

    let notifier: Box<dyn Notifier> = if config.emailjs_configured() {
        tracing::info!("sending booking notifications through EmailJS");
        Box::new(EmailJsNotifier::new(
            config.emailjs_service_id.clone(),
            config.emailjs_public_key.clone(),
            config.emailjs_private_key.clone(),
            config.emailjs_template_approved.clone(),
            config.emailjs_template_rejected.clone(),
        ))
    } else {
        tracing::info!("EmailJS not configured, notifications will only be logged");
        Box::new(LogNotifier)
    };

    let files = LocalFileStore::new(&config.upload_dir, &config.public_base_url);

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
        files: Box::new(files),
        events_tx,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
