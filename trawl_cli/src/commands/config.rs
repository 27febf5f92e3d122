use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{load_config, CommandError, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use trawl_core::TrawlConfig;

pub fn run(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            let path = config_path(cli);
            format_output(
                &OutputData::Message(path.display().to_string()),
                &cli.output,
                !cli.no_color,
            )
        }
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn config_path(cli: &Cli) -> std::path::PathBuf {
    cli.config.clone().unwrap_or_else(TrawlConfig::default_path)
}

fn show_config(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    // Never echo the secret
    if config.reddit.client_secret.is_some() {
        config.reddit.client_secret = Some("********".to_string());
    }

    if cli.output == OutputFormat::Pretty && !cli.no_color {
        println!();
        println!("{}", "Effective Configuration".bold().cyan());
        println!("{}", "=======================".cyan());
        println!("Config file: {}", config_path(cli).display().dimmed());
        println!();
        println!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let value = serde_json::to_value(&config)?;
    format_output(&OutputData::ConfigInfo(value), &cli.output, !cli.no_color)
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        return Err(CommandError::InvalidConfig(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, TrawlConfig::default().to_toml_string()?)?;

    format_output(
        &OutputData::Message(format!("Wrote default configuration to {}", path.display())),
        &cli.output,
        !cli.no_color,
    )
}
