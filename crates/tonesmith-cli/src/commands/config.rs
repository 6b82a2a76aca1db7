//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use tonesmith_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "data_dir, log_file, on_corrupt, model, api_base, api_key, \
                          timeout_secs, max_tokens_short, max_tokens_medium, max_tokens_long, \
                          temperature_subtle, temperature_balanced, temperature_strong";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let generation = &config.generation;
    let api_key = generation.api_key.as_deref().map(mask_secret);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "log_file": config.log_file,
                    "on_corrupt": config.on_corrupt,
                    "generation": {
                        "model": generation.model,
                        "api_base": generation.api_base,
                        "api_key": api_key,
                        "timeout_secs": generation.timeout_secs,
                        "max_tokens_short": generation.max_tokens_short,
                        "max_tokens_medium": generation.max_tokens_medium,
                        "max_tokens_long": generation.max_tokens_long,
                        "temperature_subtle": generation.temperature_subtle,
                        "temperature_balanced": generation.temperature_balanced,
                        "temperature_strong": generation.temperature_strong,
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!(
                "  log_file:     {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  on_corrupt:   {:?}", config.on_corrupt);
            println!();
            println!("Generation:");
            println!("  model:        {}", generation.model);
            println!("  api_base:     {}", generation.api_base);
            println!(
                "  api_key:      {}",
                api_key.as_deref().unwrap_or("(not set)")
            );
            println!("  timeout_secs: {}", generation.timeout_secs);
            println!(
                "  max_tokens:   short={} medium={} long={}",
                generation.max_tokens_short,
                generation.max_tokens_medium,
                generation.max_tokens_long
            );
            println!(
                "  temperature:  subtle={} balanced={} strong={}",
                generation.temperature_subtle,
                generation.temperature_balanced,
                generation.temperature_strong
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);

    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;
    apply_setting(&mut config, &key, &value)?;
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "api_key" && !value.is_empty() {
        mask_secret(&value)
    } else {
        value
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Apply one `key = value` assignment to a config
fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let generation = &mut config.generation;

    match key {
        "data_dir" => config.data_dir = value.into(),
        "log_file" => config.log_file = optional(value).map(PathBuf::from),
        "on_corrupt" => config.on_corrupt = value.parse()?,
        "model" => generation.model = required(key, value)?,
        "api_base" => generation.api_base = required(key, value)?.trim_end_matches('/').to_string(),
        "api_key" => generation.api_key = optional(value).map(str::to_string),
        "timeout_secs" => generation.timeout_secs = parse_number(key, value)?,
        "max_tokens_short" => generation.max_tokens_short = parse_number(key, value)?,
        "max_tokens_medium" => generation.max_tokens_medium = parse_number(key, value)?,
        "max_tokens_long" => generation.max_tokens_long = parse_number(key, value)?,
        "temperature_subtle" => generation.temperature_subtle = parse_temperature(key, value)?,
        "temperature_balanced" => generation.temperature_balanced = parse_temperature(key, value)?,
        "temperature_strong" => generation.temperature_strong = parse_temperature(key, value)?,
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional value
fn optional(value: &str) -> Option<&str> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value)
    }
}

fn required(key: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        bail!("{} cannot be empty", key);
    }
    Ok(value.trim().to_string())
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}. Expected a whole number.", key))
}

fn parse_temperature(key: &str, value: &str) -> Result<f32> {
    let temperature: f32 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}. Expected a number.", key))?;
    if !(0.0..=2.0).contains(&temperature) {
        bail!("{} must be between 0 and 2", key);
    }
    Ok(temperature)
}

/// Show only the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
