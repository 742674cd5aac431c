use std::net::SocketAddr;
use std::sync::Arc;

use docsort_core::config_file::resolve_config;
use docsort_core::{Engines, TesseractCli};
use docsort_pdf_mupdf::MupdfBackend;
use docsort_web::{AppState, DEFAULT_MAX_UPLOAD_MB, router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsort=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, file) = resolve_config();
    let server = file.server.unwrap_or_default();

    // Resolve server settings: env vars > config file > defaults
    let bind = std::env::var("DOCSORT_BIND")
        .ok()
        .or(server.bind)
        .unwrap_or_else(|| "0.0.0.0:5000".to_string());
    let addr: SocketAddr = bind.parse()?;
    let max_upload_mb = std::env::var("DOCSORT_MAX_UPLOAD_MB")
        .ok()
        .and_then(|v| v.parse().ok())
        .or(server.max_upload_mb)
        .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

    config.create_scratch_root()?;

    let tesseract = TesseractCli::new(config.tesseract_path.clone(), config.ocr_language.clone());
    if !tesseract.is_available() {
        tracing::warn!(
            program = %config.tesseract_path,
            "tesseract not found; scanned PDFs will fail to classify"
        );
    }

    tracing::info!(
        bank_threshold = config.bank_threshold,
        salary_threshold = config.salary_threshold,
        scratch = %config.scratch_root.display(),
        "configuration loaded"
    );

    let engines = Engines::new(Arc::new(MupdfBackend::new()), &config);
    let state = Arc::new(AppState::new(config, engines));
    let app = router(state, max_upload_mb);

    tracing::info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
