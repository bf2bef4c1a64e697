use anyhow::{Context, Result};
use artcat_core::config::{artcat_dir, Config};
use colored::Colorize;

pub fn run(verbose: bool) -> Result<()> {
    let dir = artcat_dir();

    std::fs::create_dir_all(&dir).context("creating ~/.artcat/")?;

    if verbose {
        println!("[verbose] artcat dir: {}", dir.display());
    }

    // Create config.toml if it doesn't exist
    let config_path = dir.join("config.toml");
    let config = if !config_path.exists() {
        let config = Config::default();
        config.save(&config_path)?;
        println!("  {} {}", "Created".green(), config_path.display());
        config
    } else {
        println!("  {} {}", "Exists".yellow(), config_path.display());
        Config::load(&config_path)?
    };

    println!();
    println!("  {} {}", "Model:".white(), config.ai.model.cyan());
    match config.api_key() {
        Some(_) => println!(
            "  {} {} is set",
            "API key:".white(),
            config.ai.api_key_env.green()
        ),
        None => println!(
            "  {} {} is not set. Export it before running `artcat analyze`.",
            "API key:".white(),
            config.ai.api_key_env.yellow()
        ),
    }

    println!();
    println!(
        "{}",
        "artcat initialized. Try `artcat analyze <imagen>` or `artcat studio`.".green().bold()
    );

    Ok(())
}
