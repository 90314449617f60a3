use super::{Services, pick_movie, with_spinner};
use crate::cli::{MovieSelector, MovieTarget};
use anyhow::{Context, Result};
use console::{Term, style};
use std::path::PathBuf;
use ytsdl::download::{save_torrent_file, torrent_file_name};
use ytsdl::metadata::normalize_imdb_id;
use ytsdl::provider::MovieId;
use ytsdl::quality::Quality;

/// What to do with the resolved torrent.
#[derive(Debug, Clone, Default)]
pub struct DownloadActions {
    pub magnet: bool,
    pub save_torrent: bool,
    pub open: bool,
    pub output_dir: Option<String>,
}

impl DownloadActions {
    /// Printing the magnet link is the default when nothing else was asked for.
    pub fn prints_magnet(&self) -> bool {
        self.magnet || !(self.save_torrent || self.open)
    }
}

pub async fn handle_download(
    services: &Services,
    movie: MovieSelector,
    quality: Option<String>,
    actions: DownloadActions,
    fzf: bool,
) -> Result<()> {
    // Status goes to stderr so stdout carries nothing but the magnet link.
    let term = Term::stderr();

    let quality = quality.unwrap_or_else(|| services.config.general.default_quality.clone());
    let tier: Quality = quality.parse()?;

    let target = movie
        .target()
        .context("One of --imdb-id, --movieid or --movie-name is required")?;

    let id = match target {
        MovieTarget::Imdb(id) => MovieId::Imdb(normalize_imdb_id(&id)?),
        MovieTarget::Provider(id) => MovieId::Provider(id),
        MovieTarget::Title(title) => match pick_movie(services, &title, fzf).await? {
            Some(record) => MovieId::Imdb(record.identifier),
            None => {
                term.write_line(&format!("{} No movie selected", style("❌").red()))?;
                return Ok(());
            }
        },
    };

    let resolver = services.resolver();
    let resolution = with_spinner(
        format!(
            "Resolving {} in {} on {}...",
            id,
            tier,
            resolver.provider().name()
        ),
        resolver.resolve(&id, &quality),
    )
    .await?;

    term.write_line(&format!(
        "{} {} [{}]",
        style("✅").green(),
        style(resolution.movie.display_title()).cyan().bold(),
        resolution.variant.describe()
    ))?;

    let mut saved_file: Option<PathBuf> = None;

    if actions.save_torrent {
        let bytes = with_spinner(
            "Downloading torrent file...".to_string(),
            services.provider.fetch_torrent_file(&resolution.variant),
        )
        .await?;

        let dir = actions
            .output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| services.config.output_dir());
        let file_name = torrent_file_name(&resolution.movie, resolution.quality);
        let path = save_torrent_file(&bytes, &dir, &file_name).await?;

        term.write_line(&format!(
            "{} Saved torrent file: {}",
            style("📁").cyan(),
            style(path.display()).cyan()
        ))?;
        saved_file = Some(path);
    }

    if actions.prints_magnet() {
        println!("{}", resolution.magnet);
    }

    if actions.open {
        let target = match &saved_file {
            Some(path) => path.display().to_string(),
            None => resolution.magnet.to_string(),
        };
        (services.opener)(&target)?;
        term.write_line(&format!(
            "{} Handed off to your torrent client",
            style("🚀").green()
        ))?;
    }

    Ok(())
}
