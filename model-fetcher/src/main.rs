mod api;
mod args;
mod error;
mod manifest;

use std::env;
use std::path::Path;

use constants::stage::StageKey;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::ModelApi;
use crate::args::{FetchArgs, TOKEN_ENV_VAR, USAGE};
use crate::error::FetchError;
use crate::manifest::{ModelEntry, ModelManifest, stage_file_name};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = match FetchArgs::parse(env::args().skip(1), env::var(TOKEN_ENV_VAR).ok()) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return Err(e.into());
        }
    };
    if args.show_help {
        println!("{}", USAGE);
        return Ok(());
    }

    let models_dir = args.models_dir();

    let api = match ModelApi::new(args.api_base.clone(), args.token.clone()) {
        Ok(api) => api,
        Err(FetchError::MissingToken) => {
            warn!("{}", FetchError::MissingToken);
            let path = ModelManifest::default().write(&models_dir)?;
            println!("Saved empty manifest: {}", path.display());
            println!("The viewer will use placeholder models.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        "Fetching {} stage model(s) from {} into {}",
        args.stages.len(),
        args.api_base,
        models_dir.display()
    );

    let mut manifest =
        ModelManifest::carry_over(ModelManifest::load(&models_dir), &args.stages, &models_dir);
    let mut failures: Vec<(StageKey, FetchError)> = Vec::new();
    let mut total_bytes = 0u64;

    for &stage in &args.stages {
        match fetch_stage(&api, stage, &models_dir).await {
            Ok((entry, bytes)) => {
                info!("{}: saved {} ({} bytes)", stage, entry.file, bytes);
                total_bytes += bytes;
                manifest.insert(entry);
            }
            Err(e) => {
                warn!("{}: skipped, {}", stage, e);
                failures.push((stage, e));
            }
        }
    }

    let manifest_path = manifest.write(&models_dir)?;

    println!("Model fetch complete:");
    println!(
        "  Downloaded: {} of {} stage(s), {:.1} MB",
        args.stages.len() - failures.len(),
        args.stages.len(),
        total_bytes as f64 / (1024.0 * 1024.0)
    );
    println!("  Manifest entries: {}", manifest.models.len());
    if !failures.is_empty() {
        println!("  Placeholders will be used for:");
        for (stage, e) in &failures {
            println!("    {}: {}", stage, e);
        }
    }
    println!("Saved {}", manifest_path.display());

    Ok(())
}

/// Search, resolve and download one stage. Returns the manifest entry and the bytes written.
async fn fetch_stage(
    api: &ModelApi,
    stage: StageKey,
    models_dir: &Path,
) -> Result<(ModelEntry, u64), FetchError> {
    let hit = api.search_first(stage.search_query()).await?;
    info!("{}: using \"{}\" ({})", stage, hit.name, hit.uid);

    let link = api.glb_download(&hit.uid).await?;
    let file = stage_file_name(stage);

    let progress = download_bar(stage, link.size);
    let bytes = match api
        .download_to(&link.url, &models_dir.join(&file), &progress)
        .await
    {
        Ok(bytes) => {
            progress.finish_with_message("done");
            bytes
        }
        Err(e) => {
            progress.abandon_with_message("failed");
            return Err(e);
        }
    };

    let title = if hit.name.trim().is_empty() {
        stage.display_name().to_string()
    } else {
        hit.name.clone()
    };

    Ok((
        ModelEntry {
            stage,
            file,
            scale: 1.0,
            source_uid: hit.uid.clone(),
            title,
            author: hit.author(),
        },
        bytes,
    ))
}

fn download_bar(stage: StageKey, size: Option<u64>) -> ProgressBar {
    let pb = ProgressBar::new(size.unwrap_or(0));
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{prefix:>16} [{bar:40.green/blue}] {bytes}/{total_bytes} ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏"));
    }
    pb.set_prefix(stage.as_str());
    pb
}
