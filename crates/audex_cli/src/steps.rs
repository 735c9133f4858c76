//! The `steps` command: list the pipeline steps in execution order.

use std::path::PathBuf;

use anyhow::{Context, Result};

use audex_core::config::ConfigManager;
use audex_core::orchestrator::create_standard_pipeline;

pub fn execute(config: Option<PathBuf>) -> Result<()> {
    let config_path = config.unwrap_or_else(|| PathBuf::from("audex.toml"));
    let mut manager = ConfigManager::new(&config_path);
    manager
        .load_or_create()
        .with_context(|| format!("failed to load config '{}'", config_path.display()))?;

    let pipeline = create_standard_pipeline(manager.settings())?;

    println!("Pipeline '{}':", pipeline.name());
    for (i, (name, description)) in pipeline.step_descriptions().iter().enumerate() {
        println!("  {}. {:<20} {}", i + 1, name, description);
    }

    Ok(())
}
