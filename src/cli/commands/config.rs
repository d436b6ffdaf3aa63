//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::Path;

/// Run the config command. `config_path` is the file in use (`--config` or the default).
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Edit => {
            if !config_path.exists() {
                settings.save_to(&config_path.to_path_buf())?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor).arg(config_path).status();

            match status {
                Ok(s) if s.success() => {
                    let reloaded = Settings::load_from(Some(&config_path.to_path_buf()));
                    match reloaded {
                        Ok(_) => Output::success("Config saved."),
                        Err(e) => Output::warning(&format!("Config saved but invalid: {}", e)),
                    }
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
