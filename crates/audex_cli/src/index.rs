//! The `index` command: run the full pipeline over one WAV file.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use audex_core::config::ConfigManager;
use audex_core::io::{load_metadata, load_wav};
use audex_core::logging::{LogConfig, RunLogger};
use audex_core::orchestrator::create_standard_pipeline;

/// Config file created next to the working directory when none is given.
const DEFAULT_CONFIG: &str = "audex.toml";

pub fn execute(
    audio: PathBuf,
    metadata: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config_path = config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut manager = ConfigManager::new(&config_path);
    manager
        .load_or_create()
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;
    manager.ensure_dirs_exist()?;
    let settings = manager.settings().clone();

    let buffer = load_wav(&audio)?;
    tracing::info!(
        path = %audio.display(),
        duration = format!("{:.2}s", buffer.duration_secs()),
        sample_rate = buffer.sample_rate,
        "audio loaded"
    );

    let metadata_path = metadata.unwrap_or_else(|| audio.with_extension("json"));
    let metadata = load_metadata(&metadata_path)?;
    if metadata.is_some() {
        tracing::info!(path = %metadata_path.display(), "metadata loaded");
    }

    let run_name = audio
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());

    let log_config = LogConfig {
        level: settings.logging.level,
        show_timestamps: settings.logging.show_timestamps,
    };
    let logger = RunLogger::to_file(&run_name, manager.logs_folder(), log_config, None)
        .context("failed to create run log")?;

    let pipeline = create_standard_pipeline(&settings)?.with_logger(Arc::new(logger));
    let report = pipeline.invoke(buffer.samples, buffer.sample_rate, metadata)?;

    if !report.errors.is_empty() {
        tracing::warn!(faults = report.errors.len(), "run completed with faults");
    }

    let json = serde_json::to_string_pretty(&report)?;
    let report_path = output.unwrap_or_else(|| {
        manager
            .output_folder()
            .join(format!("{}.index.json", run_name))
    });
    fs::write(&report_path, &json)
        .with_context(|| format!("failed to write report '{}'", report_path.display()))?;
    tracing::info!(path = %report_path.display(), "report written");

    println!("{json}");

    Ok(())
}
