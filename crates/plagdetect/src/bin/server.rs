//! PlagDetect server binary
//!
//! Run with: cargo run -p plagdetect --bin plagdetect-server
//! Set PLAGDETECT_CONFIG to a TOML file to override the defaults.

use plagdetect::{config::AppConfig, server::PlagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plagdetect=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                        PlagDetect                         ║
║        Cross-language Document Similarity Checker         ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Database: {}", config.storage.database_path.display());
    tracing::info!("  - Target language: {}", config.translation.target_language);
    tracing::info!("  - Translation failure policy: {:?}", config.comparison.translation_failure);
    tracing::info!(
        "  - Concurrent translations: {}",
        config.comparison.max_concurrent_translations
    );

    // Create server
    let server = PlagServer::new(config.clone())?;

    // Check the translation service
    if config.translation.enabled {
        tracing::info!("Checking translation service at {}...", config.translation.base_url);
        match server.state().translator().health_check().await {
            Ok(true) => tracing::info!("Translation service is running"),
            _ => {
                tracing::warn!(
                    "Translation service not available at {}",
                    config.translation.base_url
                );
                tracing::warn!("Start a LibreTranslate instance, for example:");
                tracing::warn!("  docker run -p 5000:5000 libretranslate/libretranslate");
                tracing::warn!("or set translation.enabled = false to store documents untranslated");
            }
        }
    } else {
        tracing::warn!("Translation disabled, documents are compared in their original language");
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/compare   - Upload pivot and target files and compare them");
    println!("  GET  /api/documents - Browse stored documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
