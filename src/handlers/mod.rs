pub mod browse;
pub mod config;
pub mod download;
pub mod search;

#[cfg(test)]
mod testing;

use crate::cli::{Commands, ConfigAction};
use anyhow::Result;
use console::{Term, style};
use dialoguer::FuzzySelect;
use dialoguer::theme::ColorfulTheme;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use ytsdl::config::Config;
use ytsdl::download::open_with_default_handler;
use ytsdl::error::Error;
use ytsdl::http::HttpClient;
use ytsdl::metadata::{ImdbLookup, MovieLookup, MovieRecord};
use ytsdl::provider::{ProviderKind, TorrentProvider};
use ytsdl::resolver::TorrentResolver;

// Re-export all handlers
pub use browse::handle_browse;
pub use config::handle_config;
pub use download::handle_download;
pub use search::handle_search;

/// Check if config validation should be skipped for certain commands
pub fn should_skip_config_validation(command: &Commands) -> bool {
    matches!(
        command,
        Commands::Config {
            action: ConfigAction::Validate | ConfigAction::Sample { .. } | ConfigAction::Path
        }
    )
}

/// Hands a `.torrent` path or magnet link to whatever should open it.
pub type Opener = Box<dyn Fn(&str) -> ytsdl::Result<()> + Send + Sync>;

/// Collaborators for one invocation, all sharing a single HTTP client.
pub struct Services {
    pub config: Config,
    pub lookup: Box<dyn MovieLookup>,
    pub provider: Box<dyn TorrentProvider>,
    pub opener: Opener,
}

impl Services {
    pub fn new(config: &Config, provider: Option<&str>) -> ytsdl::Result<Self> {
        let kind: ProviderKind = provider
            .unwrap_or(config.general.provider.as_str())
            .parse()?;
        let http = HttpClient::new(&config.http)?;

        Ok(Self {
            config: config.clone(),
            lookup: Box::new(ImdbLookup::new(http.clone(), &config.providers.imdb)),
            provider: kind.build(http, config),
            opener: Box::new(open_with_default_handler),
        })
    }

    pub fn resolver(&self) -> TorrentResolver<'_> {
        TorrentResolver::new(
            &*self.provider,
            self.config.trackers.clone(),
            self.config.general.selection,
        )
    }
}

/// Await `future` behind a spinner on stderr.
pub async fn with_spinner<F: Future>(message: String, future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let output = future.await;
    spinner.finish_and_clear();
    output
}

/// One line per candidate: identifier, title and year, headline credits.
pub fn candidate_label(record: &MovieRecord) -> String {
    if record.cast.is_empty() {
        format!("{}  {}", record.identifier, record.display_title())
    } else {
        format!(
            "{}  {}  ({})",
            record.identifier,
            record.display_title(),
            record.cast.join(", ")
        )
    }
}

/// Let the user fuzzy-pick one of `records`. `None` if they cancel.
pub fn choose_movie(records: &[MovieRecord]) -> Result<Option<MovieRecord>> {
    if !Term::stderr().is_term() {
        return Err(Error::Validation("--fzf needs an interactive terminal".to_string()).into());
    }

    let labels: Vec<String> = records.iter().map(candidate_label).collect();
    let choice = FuzzySelect::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a movie")
        .items(&labels)
        .default(0)
        .interact_opt()?;

    Ok(choice.and_then(|index| records.get(index).cloned()))
}

/// Search by title and pick a single movie: interactively with `fzf`, otherwise the top match.
///
/// No matches is a `MovieNotFound`; `None` means the user cancelled the picker.
pub async fn pick_movie(
    services: &Services,
    title: &str,
    fzf: bool,
) -> Result<Option<MovieRecord>> {
    let records = with_spinner(
        format!("Searching {} for '{}'...", services.lookup.name(), title),
        services.lookup.search_by_title(title),
    )
    .await?;

    if records.is_empty() {
        return Err(Error::MovieNotFound(title.to_string()).into());
    }

    if fzf {
        return choose_movie(&records);
    }

    let top = records[0].clone();
    Term::stderr().write_line(&format!(
        "{} Best match: {}",
        style("🎬").cyan(),
        style(candidate_label(&top)).cyan().bold()
    ))?;
    Ok(Some(top))
}
