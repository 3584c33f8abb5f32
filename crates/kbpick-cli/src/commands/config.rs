use anyhow::Result;
use kbpick_core::config::AppConfig;
use kbpick_infrastructure::{ConfigService, KbPickPaths};

/// Writes a default `config.toml` unless one exists.
pub fn init(paths: &KbPickPaths) -> Result<()> {
    let service = ConfigService::new(paths)?;
    if service.path().exists() {
        println!("{} already exists", service.path().display());
        return Ok(());
    }
    service.save(&AppConfig::default())?;
    println!("Wrote {}", service.path().display());
    println!("Set anon_key (or KBPICK_ANON_KEY) before logging in.");
    Ok(())
}
