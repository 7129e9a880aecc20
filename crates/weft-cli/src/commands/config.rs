use std::path::Path;

use weft_core::WeftConfig;

pub fn init(path: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("weft.toml");
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }
    std::fs::write(&output, WeftConfig::scaffold().to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

pub fn show(path: &str) -> anyhow::Result<()> {
    let config_path = Path::new(path);
    let config = if config_path.exists() {
        WeftConfig::from_file(config_path)?
    } else {
        tracing::info!(path, "no config file found; showing defaults");
        WeftConfig::default()
    };
    print!("{}", config.to_toml_string()?);
    Ok(())
}
