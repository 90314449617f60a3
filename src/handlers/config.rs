use crate::cli::ConfigAction;
use anyhow::Result;
use console::{Term, style};
use std::path::PathBuf;
use ytsdl::config::ConfigManager;
use ytsdl::error::Error;

pub fn handle_config(config_manager: &ConfigManager, action: ConfigAction) -> Result<()> {
    let term = Term::stdout();

    match action {
        ConfigAction::Show => {
            if config_manager.loaded_from_disk() {
                term.write_line(&format!(
                    "{} Current configuration ({}):",
                    style("⚙️").cyan(),
                    config_manager.config_file().display()
                ))?;
            } else {
                term.write_line(&format!(
                    "{} Current configuration (built-in defaults, no file at {}):",
                    style("⚙️").cyan(),
                    config_manager.config_file().display()
                ))?;
            }

            term.write_line("")?;
            term.write_line(&config_manager.to_toml()?)?;
        }

        ConfigAction::Path => {
            term.write_line(&config_manager.config_file().display().to_string())?;
        }

        ConfigAction::Validate => {
            term.write_line(&format!(
                "{} Validating configuration...",
                style("🔍").cyan()
            ))?;

            if let Err(e) = config_manager.validate() {
                term.write_line(&format!(
                    "{} Configuration validation failed:",
                    style("❌").red()
                ))?;
                term.write_line(&format!("   {:#}", e))?;
                return Err(Error::Validation(format!("{:#}", e)).into());
            }

            term.write_line(&format!("{} Configuration is valid", style("✅").green()))?;
        }

        ConfigAction::Sample { output, force } => {
            let sample_file = output
                .map(PathBuf::from)
                .unwrap_or_else(|| config_manager.config_file().to_path_buf());

            ConfigManager::write_sample(&sample_file, force)
                .map_err(|e| Error::Validation(format!("{:#}", e)))?;

            term.write_line(&format!(
                "{} Sample configuration created at: {}",
                style("✅").green(),
                sample_file.display()
            ))?;
            term.write_line(&format!(
                "{} Run 'ytsdl config validate' after editing it",
                style("💡").yellow()
            ))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sample_then_validate() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("base.toml");
        ConfigManager::write_sample(&base, false).unwrap();
        let manager = ConfigManager::load(Some(&base)).unwrap();

        let path = dir.path().join("config.toml");

        handle_config(
            &manager,
            ConfigAction::Sample {
                output: Some(path.display().to_string()),
                force: false,
            },
        )
        .unwrap();
        assert!(path.exists());

        let err = handle_config(
            &manager,
            ConfigAction::Sample {
                output: Some(path.display().to_string()),
                force: false,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(_))
        ));

        let manager = ConfigManager::load(Some(&path)).unwrap();
        assert!(handle_config(&manager, ConfigAction::Validate).is_ok());
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\ndefault_quality = \"480p\"\n").unwrap();

        let manager = ConfigManager::load(Some(&path)).unwrap();
        let err = handle_config(&manager, ConfigAction::Validate).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Validation(_))
        ));
    }
}
