use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use ce_assist::approvals::ApprovalService;
use ce_assist::config::AppConfig;
use ce_assist::routes::app_routes;
use ce_assist::store::{ApprovalStore, JsonFileStore};
use ce_assist::threads::{ThreadCatalog, loader};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Keep the guard alive so buffered file logs flush on exit
    let _log_guard = init_tracing(&config);

    eprintln!("📨 CE Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Data dir: {}", config.data_dir.display());

    // ── Dataset ──────────────────────────────────────────────────────────
    let threads = loader::load_dataset(&config.dataset_path())
        .await
        .context("failed to load thread dataset")?;
    let crm = loader::load_crm(&config.crm_path())
        .await
        .context("failed to load CRM records")?;
    let catalog = Arc::new(ThreadCatalog::new(threads, &crm));
    eprintln!("   Threads: {} ({} CRM orders)", catalog.len(), crm.len());

    // ── Approvals ────────────────────────────────────────────────────────
    let approvals_path = config.approvals_path();
    let store = JsonFileStore::open(approvals_path.clone())
        .await
        .with_context(|| format!("failed to open approvals at {}", approvals_path.display()))?;
    eprintln!(
        "   Approvals: {} ({})",
        store.count().await?,
        store.path().display()
    );

    let service = Arc::new(
        ApprovalService::new(catalog, Arc::new(store))
            .with_default_approver(config.default_approver.clone())
            .with_export_path(config.export_path()),
    );

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = app_routes(service, config.minutes_per_approval);
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    eprintln!("   API: http://{}/api/threads\n", addr);
    tracing::info!(addr = %addr, "CE Assist server started");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn init_tracing(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ce-assist.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    }
}
