//! Configuration commands.
//!
//! - `config set`: Set a configuration value
//! - `config show`: Display current configuration

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::utils::mask_secret;

/// Reject underscore spellings of dotted keys with a suggestion.
fn validate_config_key(key: &str) -> Result<&str> {
    if key == "page_size" {
        return Ok(key);
    }

    if !key.contains('.')
        && let Some(pos) = key.find('_')
    {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(DeskError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dot_version}'"
        )));
    }
    Ok(key)
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let config_path = Config::config_path()?;
    let token = config.token();

    let json_output = json!({
        "api": {
            "base_url": config.api_url(),
            "timeout": config.api.timeout,
        },
        "auth": {
            "token_configured": token.is_some(),
            "user_id": config.auth.user_id,
        },
        "page_size": config.page_size(),
        "config_file": config_path.to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "api".cyan()));
    text_output.push_str(&format!("  base_url: {}\n", config.api_url()));
    text_output.push_str(&format!("  timeout: {}s\n", config.api.timeout));
    text_output.push('\n');

    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    let token_display = match &token {
        Some(token) => mask_secret(token).green().to_string(),
        None => "not configured".dimmed().to_string(),
    };
    text_output.push_str(&format!("  token: {token_display}\n"));
    let user_display = match config.auth.user_id {
        Some(id) => id.to_string(),
        None => "not configured".dimmed().to_string(),
    };
    text_output.push_str(&format!("  user_id: {user_display}\n"));
    text_output.push('\n');

    text_output.push_str(&format!("{}: {}\n\n", "page_size".cyan(), config.page_size()));
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;

    let mut config = Config::load()?;
    config.set(key, value)?;
    let path = config.save()?;

    let shown = if key == "auth.token" {
        mask_secret(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "config_file": path.to_string_lossy(),
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(output)
}
