mod cli;
mod handlers;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use handlers::Services;
use handlers::browse::BrowseFilters;
use handlers::download::DownloadActions;
use std::path::Path;
use std::process;
use ytsdl::config::ConfigManager;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Cli::parse();

    // Validate CLI arguments first
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        process::exit(2);
    }

    // Logs go to stderr; stdout is reserved for command output
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    // Everything `run` built, the HTTP client included, is dropped before exiting
    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) => report(&e),
    };

    process::exit(code);
}

async fn run(args: Cli) -> Result<()> {
    let config_path = args.config.as_deref().map(Path::new);
    // `config path` and `config sample` name the file; it need not exist yet
    let config_manager = match &args.command {
        Commands::Config {
            action: ConfigAction::Path | ConfigAction::Sample { .. },
        } => ConfigManager::locate(config_path),
        _ => ConfigManager::load(config_path),
    }
    .map_err(|e| ytsdl::Error::Validation(format!("{:#}", e)))?;

    if !handlers::should_skip_config_validation(&args.command) {
        if let Err(e) = config_manager.validate() {
            eprintln!("Run 'ytsdl config validate' for a detailed report");
            return Err(
                ytsdl::Error::Validation(format!("Configuration is invalid: {:#}", e)).into(),
            );
        }
    }

    match args.command {
        Commands::Search {
            movie,
            provider,
            list,
            fzf,
        } => {
            let services = Services::new(config_manager.config(), provider.as_deref())?;
            handlers::handle_search(&services, movie, list, fzf, args.verbose).await?;
        }
        Commands::Download {
            movie,
            provider,
            quality,
            magnet,
            save_torrent,
            open,
            output_dir,
            fzf,
        } => {
            let services = Services::new(config_manager.config(), provider.as_deref())?;
            let actions = DownloadActions {
                magnet,
                save_torrent,
                open,
                output_dir,
            };
            handlers::handle_download(&services, movie, quality, actions, fzf).await?;
        }
        Commands::Browse {
            query,
            provider,
            quality,
            genre,
            minimum_rating,
            sort_by,
            order_by,
            limit,
            page,
        } => {
            let services = Services::new(config_manager.config(), provider.as_deref())?;
            let filters = BrowseFilters {
                query,
                quality,
                genre,
                minimum_rating,
                sort_by,
                order_by,
                limit,
                page,
            };
            handlers::handle_browse(&services, filters).await?;
        }
        Commands::Config { action } => {
            handlers::handle_config(&config_manager, action)?;
        }
    }

    Ok(())
}

/// Print `error` and map it to the process exit code.
fn report(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<ytsdl::Error>() {
        Some(known) => {
            eprintln!("Error: {}", known);
            known.exit_code()
        }
        None => {
            eprintln!("Error: unexpected failure: {:#}", error);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_errors_keep_their_exit_code() {
        let error: anyhow::Error = ytsdl::Error::MovieNotFound("tt0000000".into()).into();
        assert_eq!(report(&error), 11);

        let error: anyhow::Error = ytsdl::Error::InvalidQuality("480p".into()).into();
        assert_eq!(report(&error), 12);
    }

    #[test]
    fn test_unexpected_errors_exit_with_one() {
        let error = anyhow::anyhow!("terminal went away");
        assert_eq!(report(&error), 1);
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_a_validation_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let args = Cli::try_parse_from([
            "ytsdl",
            "config",
            "show",
            "--config",
            missing.to_str().unwrap(),
        ])
        .unwrap();

        let error = run(args).await.unwrap_err();
        assert_eq!(report(&error), 2);
    }

    #[tokio::test]
    async fn test_sample_creates_the_explicit_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("new.toml");
        let args = Cli::try_parse_from([
            "ytsdl",
            "--config",
            path.to_str().unwrap(),
            "config",
            "sample",
        ])
        .unwrap();

        run(args).await.unwrap();
        assert!(path.exists());

        let args = Cli::try_parse_from([
            "ytsdl",
            "--config",
            path.to_str().unwrap(),
            "config",
            "validate",
        ])
        .unwrap();
        run(args).await.unwrap();
    }
}
