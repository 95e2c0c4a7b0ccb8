//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand};
use console::style;

use chit_core::models::config::ChitConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a configuration value (e.g., "engine.min_confidence")
    Get {
        /// Configuration key
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value ("none" clears fallback.endpoint)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

/// Every key reachable through get/set. The config surface is small enough
/// that the keys are enumerated rather than walked generically, which keeps
/// value parsing and range checks typed.
const KEYS: &[&str] = &[
    "engine.min_confidence",
    "engine.disambiguation_floor",
    "fallback.endpoint",
    "fallback.timeout_ms",
];

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chit")
        .join("config.json")
}

fn load_or_default(config_path: &PathBuf) -> anyhow::Result<ChitConfig> {
    if config_path.exists() {
        Ok(ChitConfig::from_file(config_path)?)
    } else {
        Ok(ChitConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    let config_path = default_config_path();

    if !config_path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }
    let config = load_or_default(&config_path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = ChitConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let config = load_or_default(&default_config_path())?;

    println!("{}", get_value(&config, key)?);

    Ok(())
}

fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();

    let mut config = load_or_default(&config_path)?;
    set_value(&mut config, key, value)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(&config_path)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'chit config init' to create a configuration file.");
    }

    Ok(())
}

fn get_value(config: &ChitConfig, key: &str) -> anyhow::Result<String> {
    let value = match key {
        "engine.min_confidence" => config.engine.min_confidence.to_string(),
        "engine.disambiguation_floor" => config.engine.disambiguation_floor.to_string(),
        "fallback.endpoint" => config
            .fallback
            .endpoint
            .clone()
            .unwrap_or_else(|| "none".to_string()),
        "fallback.timeout_ms" => config.fallback.timeout_ms.to_string(),
        _ => return Err(unknown_key(key)),
    };

    Ok(value)
}

/// Apply one typed assignment on a draft and commit only when the threshold
/// ranges still hold, so a rejected value never sticks.
fn set_value(config: &mut ChitConfig, key: &str, value: &str) -> anyhow::Result<()> {
    let mut draft = config.clone();

    match key {
        "engine.min_confidence" => draft.engine.min_confidence = parse_as(key, value)?,
        "engine.disambiguation_floor" => {
            draft.engine.disambiguation_floor = parse_as(key, value)?
        }
        "fallback.endpoint" => {
            draft.fallback.endpoint = match value {
                "" | "none" => None,
                url => Some(url.to_string()),
            }
        }
        "fallback.timeout_ms" => draft.fallback.timeout_ms = parse_as(key, value)?,
        _ => return Err(unknown_key(key)),
    }

    draft.validate()?;
    *config = draft;
    Ok(())
}

fn parse_as<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown configuration key: {} (known keys: {})",
        key,
        KEYS.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_value_covers_every_key() {
        let config = ChitConfig::default();

        assert_eq!(get_value(&config, "engine.min_confidence").unwrap(), "0.5");
        assert_eq!(
            get_value(&config, "engine.disambiguation_floor").unwrap(),
            "0.85"
        );
        assert_eq!(get_value(&config, "fallback.endpoint").unwrap(), "none");
        assert_eq!(get_value(&config, "fallback.timeout_ms").unwrap(), "10000");
    }

    #[test]
    fn test_get_value_rejects_unknown_key() {
        let config = ChitConfig::default();
        let err = get_value(&config, "engine.nope").unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key"));
    }

    #[test]
    fn test_set_value_parses_typed_fields() {
        let mut config = ChitConfig::default();

        set_value(&mut config, "engine.min_confidence", "0.7").unwrap();
        assert_eq!(config.engine.min_confidence, 0.7);

        set_value(&mut config, "fallback.timeout_ms", "2500").unwrap();
        assert_eq!(config.fallback.timeout_ms, 2500);

        set_value(&mut config, "fallback.endpoint", "http://localhost:9000/parse").unwrap();
        assert_eq!(
            config.fallback.endpoint.as_deref(),
            Some("http://localhost:9000/parse")
        );

        set_value(&mut config, "fallback.endpoint", "none").unwrap();
        assert_eq!(config.fallback.endpoint, None);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = ChitConfig::default();

        // Wrong type for the field.
        assert!(set_value(&mut config, "fallback.timeout_ms", "soon").is_err());
        // Parses but fails the range check.
        assert!(set_value(&mut config, "engine.min_confidence", "1.5").is_err());
        // Unknown key.
        assert!(set_value(&mut config, "fallback.retries", "3").is_err());

        // Nothing out of range was persisted into the struct's thresholds.
        assert!(config.validate().is_ok());
    }
}
