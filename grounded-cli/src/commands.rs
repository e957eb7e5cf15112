//! CLI subcommand handlers.

use std::path::Path;

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file to the workspace
    Init,
    /// Print the effective merged configuration
    Show,
}

/// Handle a `config` subcommand.
pub fn handle_config(action: ConfigAction, workspace: &Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_dir = workspace.join(".grounded");
            std::fs::create_dir_all(&config_dir)?;

            let config_path = config_dir.join("config.toml");
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }

            let default_config = grounded_core::AppConfig::default();
            let toml_str = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = grounded_core::config::load_config(Some(workspace), None)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_init_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        handle_config(ConfigAction::Init, dir.path()).unwrap();

        let path = dir.path().join(".grounded").join("config.toml");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[openai]"));
        assert!(content.contains("[indexer]"));
        assert!(content.contains("api_version"));
    }

    #[test]
    fn test_config_init_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".grounded");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "show_citations = true\n").unwrap();

        handle_config(ConfigAction::Init, dir.path()).unwrap();
        let content = std::fs::read_to_string(config_dir.join("config.toml")).unwrap();
        assert_eq!(content, "show_citations = true\n");
    }
}
