use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::{error, info, warn};
use wastesort::{web, ImageModel, KnowledgeBase, ModelManager, ModelSlot, ServerConfig};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the web UI to
    #[arg(long, global = true, env = "WASTESORT_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true, env = "WASTESORT_PORT")]
    port: Option<u16>,

    /// Directory holding downloaded models
    #[arg(long, global = true, env = "WASTESORT_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Remote location of the ONNX model artifact
    #[arg(long, global = true, env = "WASTESORT_MODEL_URL")]
    model_url: Option<String>,

    /// Expected SHA-256 of the model artifact
    #[arg(long, global = true, env = "WASTESORT_MODEL_SHA256")]
    model_sha256: Option<String>,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, global = true, default_value_t = 0)]
    intra_threads: usize,

    /// Largest accepted upload in megabytes
    #[arg(long, global = true, value_parser = clap::value_parser!(u16).range(1..=1024))]
    max_upload_mb: Option<u16>,

    /// Force a fresh download of the model file
    #[arg(short, long, global = true)]
    fresh: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the upload page (default)
    Serve {
        /// Download and load the model before accepting requests
        #[arg(long)]
        preload: bool,
    },
    /// Classify one image and print the guidance for its category
    Classify {
        image: PathBuf,
    },
}

impl Args {
    fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = &self.models_dir {
            config.models_dir = dir.clone();
        }
        if let Some(url) = &self.model_url {
            config.model_url = url.clone();
        }
        if let Some(hash) = &self.model_sha256 {
            config.model_sha256 = Some(hash.clone());
        }
        if let Some(mb) = self.max_upload_mb {
            config.max_upload_bytes = usize::from(mb) * 1024 * 1024;
        }
        config.runtime.intra_threads = self.intra_threads;
        config
    }
}

fn build_slot(config: &ServerConfig, fresh: bool) -> anyhow::Result<ModelSlot> {
    let manager = ModelManager::new(&config.models_dir)
        .with_context(|| format!("Failed to create models directory {:?}", config.models_dir))?;
    let info = config.model_info();

    if fresh {
        info!("Fresh download requested - removing any existing model file...");
        manager.remove_download(&info)?;
    }

    Ok(ModelSlot::new(manager, info, config.runtime.clone()))
}

async fn serve(config: ServerConfig, slot: ModelSlot, preload: bool) -> anyhow::Result<()> {
    if preload {
        slot.ensure_model().await.context("Failed to provision model")?;
    } else {
        match slot.load_if_present().await {
            Ok(Some(_)) => info!("Model loaded from {:?}", slot.model_path()),
            Ok(None) => warn!("Model not downloaded yet; use the download button in the UI"),
            Err(e) => error!("Model at {:?} could not be loaded: {}", slot.model_path(), e),
        }
    }

    let state = web::AppState::new(Arc::new(slot), config.max_upload_bytes);
    let app = web::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Waste classifier UI listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn classify_file(slot: ModelSlot, image: PathBuf) -> anyhow::Result<()> {
    let bytes = std::fs::read(&image).with_context(|| format!("Failed to read {:?}", image))?;
    let model = slot.ensure_model().await?;
    let result = tokio::task::spawn_blocking(move || model.classify_bytes(&bytes)).await??;
    let info = KnowledgeBase::builtin().lookup(result.label);

    println!("Predicted Waste Class: {} with {:.2}% confidence", result.label, result.rounded_confidence());
    println!("\n{}", info.description);
    println!("\nExample items:");
    for item in &info.example_items {
        println!("  - {}", item);
    }
    println!("\nDisposal tips:");
    for tip in &info.disposal_tips {
        println!("  - {}", tip);
    }
    println!("\nLearn more:");
    for link in &info.reference_links {
        println!("  {}: {}", link.title, link.url);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = args.config();

    info!("=== Starting Waste Classifier ===");
    info!("Models directory: {:?}", config.models_dir);
    info!("Model source: {}", config.model_url);

    let slot = build_slot(&config, args.fresh)?;
    match args.command {
        Some(Command::Classify { image }) => classify_file(slot, image).await,
        Some(Command::Serve { preload }) => serve(config, slot, preload).await,
        None => serve(config, slot, false).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_accepted_after_subcommand() {
        let args = Args::try_parse_from(["wastesort_server", "serve", "--port", "9000", "--preload"]).unwrap();
        assert_eq!(args.port, Some(9000));
        assert!(matches!(args.command, Some(Command::Serve { preload: true })));

        let args = Args::try_parse_from(["wastesort_server", "--port", "9001", "classify", "bin.jpg"]).unwrap();
        assert_eq!(args.config().port, 9001);
    }

    #[test]
    fn test_upload_limit_is_bounded() {
        let args = Args::try_parse_from(["wastesort_server", "--max-upload-mb", "25"]).unwrap();
        assert_eq!(args.config().max_upload_bytes, 25 * 1024 * 1024);

        assert!(Args::try_parse_from(["wastesort_server", "--max-upload-mb", "0"]).is_err());
        assert!(Args::try_parse_from(["wastesort_server", "--max-upload-mb", "18446744073709551615"]).is_err());
    }
}
