//! Write the default configuration file.

use std::path::PathBuf;

use vidmark_common::config::{config_file_path, AppConfig};

pub fn run(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let config = AppConfig::default();
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Config written to {}", path.display());
    println!("  Output directory: {}", config.output_dir.display());
    println!("  Preset: {}", config.export.preset.as_str());
    println!("  Container: {}", config.export.container.extension());
    println!("  Frame rate: {}", config.export.frame_rate);
    println!("  Output file name: {}", config.export.output_file_name);

    Ok(())
}
