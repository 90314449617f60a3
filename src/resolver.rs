use crate::magnet::MagnetLink;
use crate::provider::{MovieId, ProviderMovie, TorrentProvider, TorrentVariant};
use crate::quality::{Quality, SelectionStrategy, select_variant};
use tracing::{debug, info};

/// The outcome of resolving a movie to a single downloadable variant.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub movie: ProviderMovie,
    pub quality: Quality,
    pub variant: TorrentVariant,
    pub magnet: MagnetLink,
}

/// Maps (movie, quality) to one torrent variant and its magnet link.
pub struct TorrentResolver<'a> {
    provider: &'a dyn TorrentProvider,
    trackers: Vec<String>,
    strategy: SelectionStrategy,
}

impl<'a> TorrentResolver<'a> {
    pub fn new(
        provider: &'a dyn TorrentProvider,
        trackers: Vec<String>,
        strategy: SelectionStrategy,
    ) -> Self {
        Self {
            provider,
            trackers,
            strategy,
        }
    }

    pub fn provider(&self) -> &dyn TorrentProvider {
        self.provider
    }

    /// Fetch the movie's variants, select one for `quality` and build its magnet link.
    ///
    /// The quality string is checked before any request is made.
    pub async fn resolve(&self, id: &MovieId, quality: &str) -> crate::Result<Resolution> {
        let quality: Quality = quality.parse()?;

        let movie = self.provider.movie(id).await?;
        let (variant, magnet) = self.select(&movie, quality)?;

        info!(
            "Resolved {} [{}] to {}",
            movie.display_title(),
            quality,
            variant.content_hash
        );

        Ok(Resolution {
            movie,
            quality,
            variant,
            magnet,
        })
    }

    /// Selection and magnet construction on an already fetched movie.
    pub fn select(
        &self,
        movie: &ProviderMovie,
        quality: Quality,
    ) -> crate::Result<(TorrentVariant, MagnetLink)> {
        let variant = select_variant(
            &movie.variants,
            quality,
            self.strategy,
            &movie.display_title(),
        )?;
        debug!("Selected variant: {}", variant.describe());

        let magnet = MagnetLink::from_hash(&variant.content_hash, &self.trackers)?;
        Ok((variant.clone(), magnet))
    }
}
