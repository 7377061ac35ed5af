//! Config command - create or inspect the user config file

use crate::config::{ConfigOverrides, EvalConfig, UserConfig};
use anyhow::Result;
use console::style;
use std::path::PathBuf;

/// `doceval config init`
pub fn init() -> Result<()> {
    let path = UserConfig::init_user_config()?;
    println!(
        "{} User config at {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    println!("  Edit it to set your Azure OpenAI endpoint, deployment and key.");
    Ok(())
}

/// `doceval config show`
pub fn show(config_file: Option<PathBuf>) -> Result<()> {
    let overrides = ConfigOverrides {
        config_file,
        ..Default::default()
    };
    let config = EvalConfig::load(overrides)?;

    let unset = || style("(not set)").dim().to_string();
    let user_path = UserConfig::user_config_path();

    println!("{}", style("Config files").bold());
    match &user_path {
        Some(path) if path.exists() => println!("  user:    {}", path.display()),
        Some(path) => println!("  user:    {} {}", path.display(), style("(missing)").dim()),
        None => println!("  user:    {}", unset()),
    }

    println!("\n{}", style("Azure OpenAI").bold());
    println!(
        "  endpoint:     {}",
        config.endpoint.clone().unwrap_or_else(unset)
    );
    println!(
        "  deployment:   {}",
        config.deployment.clone().unwrap_or_else(unset)
    );
    println!("  api_version:  {}", config.api_version);
    println!(
        "  api_key:      {}",
        config.masked_api_key().unwrap_or_else(unset)
    );

    println!("\n{}", style("Evaluation").bold());
    println!("  max_tokens_per_chunk:  {}", config.max_tokens_per_chunk);
    println!("  max_retries:           {}", config.max_retries);
    println!("  temperature:           {}", config.temperature);
    println!("  max_response_tokens:   {}", config.max_response_tokens);
    println!(
        "  request_timeout_secs:  {}",
        config.request_timeout.as_secs()
    );
    println!("  encoding:              {}", config.encoding);
    println!("  score_mode:            {:?}", config.score_mode);
    println!("  extensions:            {}", config.extensions.join(", "));

    if let Err(e) = config.scorer_settings() {
        println!("\n{} {}", style("!").yellow(), e);
    }

    Ok(())
}
