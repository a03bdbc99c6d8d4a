use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;
use schoolday_core::SchoolConfig;

pub fn run(config_path: &Path) -> Result<()> {
    if !config_path.exists() {
        SchoolConfig::create_default_config(config_path)?;
        println!("{}", "Created a starter config".green());
    }

    let config = SchoolConfig::load(config_path);

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());
    match &config {
        Ok(config) => println!("  Overrides:  {}", config.overrides_path()?.display()),
        Err(e) => println!("  Overrides:  {}", format!("unavailable ({})", e).dimmed()),
    }

    if let Ok(config) = &config {
        let unknown = config.unknown_schedule_references();
        if !unknown.is_empty() {
            println!();
            println!(
                "{} {}",
                "Unknown schedules referenced:".yellow(),
                unknown.join(", ")
            );
        }
    }

    Ok(())
}
