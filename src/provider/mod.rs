pub mod yts;

use crate::config::Config;
use crate::error::Error;
use crate::http::HttpClient;
use crate::quality::Quality;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use yts::YtsProvider;

/// Identifies a movie either by the provider's own ID or by its IMDb ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieId {
    Imdb(String),
    Provider(String),
}

impl MovieId {
    pub fn value(&self) -> &str {
        match self {
            MovieId::Imdb(id) | MovieId::Provider(id) => id,
        }
    }

    pub fn is_imdb(&self) -> bool {
        matches!(self, MovieId::Imdb(_))
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::Imdb(id) => write!(f, "{}", id),
            MovieId::Provider(id) => write!(f, "#{}", id),
        }
    }
}

/// One downloadable torrent of a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentVariant {
    pub quality_label: String,
    pub content_hash: String,
    pub url: Option<String>,
    /// Release kind, e.g. "web" or "bluray".
    pub kind: Option<String>,
    pub size: Option<String>,
    pub seeds: Option<u32>,
    pub peers: Option<u32>,
}

impl TorrentVariant {
    pub fn new(quality_label: &str, content_hash: &str) -> Self {
        Self {
            quality_label: quality_label.to_string(),
            content_hash: content_hash.to_string(),
            url: None,
            kind: None,
            size: None,
            seeds: None,
            peers: None,
        }
    }

    /// Short human description, e.g. "1080p bluray 1.6 GB".
    pub fn describe(&self) -> String {
        let mut parts = vec![self.quality_label.clone()];
        parts.extend(self.kind.clone());
        parts.extend(self.size.clone());
        parts.join(" ")
    }
}

/// A movie as listed by a torrent provider, with its variants in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMovie {
    pub provider_id: String,
    pub imdb_id: Option<String>,
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub genres: Vec<String>,
    pub variants: Vec<TorrentVariant>,
}

impl ProviderMovie {
    /// "Title (Year)" or just the title.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// Largest page a browse request may ask for.
pub const MAX_BROWSE_LIMIT: u32 = 50;

/// Catalogue field a browse listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Year,
    Rating,
    Peers,
    Seeds,
    DownloadCount,
    LikeCount,
    DateAdded,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Title,
        SortField::Year,
        SortField::Rating,
        SortField::Peers,
        SortField::Seeds,
        SortField::DownloadCount,
        SortField::LikeCount,
        SortField::DateAdded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Rating => "rating",
            SortField::Peers => "peers",
            SortField::Seeds => "seeds",
            SortField::DownloadCount => "download_count",
            SortField::LikeCount => "like_count",
            SortField::DateAdded => "date_added",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                Error::Validation(format!(
                    "Unknown sort field '{}'. Expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(Error::Validation(format!(
                "Unknown sort order '{}'. Expected asc or desc",
                s
            ))),
        }
    }
}

/// Filters and paging for listing a provider's catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseQuery {
    pub query_term: Option<String>,
    pub quality: Option<Quality>,
    pub genre: Option<String>,
    pub minimum_rating: Option<u8>,
    pub sort_by: Option<SortField>,
    pub order_by: Option<SortOrder>,
    pub limit: u32,
    pub page: u32,
}

impl Default for BrowseQuery {
    fn default() -> Self {
        Self {
            query_term: None,
            quality: None,
            genre: None,
            minimum_rating: None,
            sort_by: None,
            order_by: None,
            limit: 20,
            page: 1,
        }
    }
}

impl BrowseQuery {
    pub fn validate(&self) -> crate::Result<()> {
        if self.limit == 0 || self.limit > MAX_BROWSE_LIMIT {
            return Err(Error::Validation(format!(
                "Limit must be between 1 and {}, got {}",
                MAX_BROWSE_LIMIT, self.limit
            )));
        }
        if self.page == 0 {
            return Err(Error::Validation("Page numbers start at 1".to_string()));
        }
        if let Some(rating) = self.minimum_rating.filter(|r| *r > 9) {
            return Err(Error::Validation(format!(
                "Minimum rating must be between 0 and 9, got {}",
                rating
            )));
        }
        Ok(())
    }
}

/// One page of a provider's catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct MoviePage {
    /// Movies matching the query across every page.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub movies: Vec<ProviderMovie>,
}

impl MoviePage {
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.limit))
        }
    }
}

/// A torrent index that lists variants of a movie.
#[async_trait]
pub trait TorrentProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch a movie and its variants.
    async fn movie(&self, id: &MovieId) -> crate::Result<ProviderMovie>;

    /// List one page of the catalogue.
    async fn browse(&self, query: &BrowseQuery) -> crate::Result<MoviePage>;

    /// Download the `.torrent` file behind a variant as an opaque blob.
    async fn fetch_torrent_file(&self, variant: &TorrentVariant) -> crate::Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yts,
}

impl ProviderKind {
    pub const SUPPORTED: &'static [&'static str] = &["YTS"];

    /// Build the provider on top of a shared HTTP client.
    pub fn build(self, http: HttpClient, config: &Config) -> Box<dyn TorrentProvider> {
        match self {
            ProviderKind::Yts => Box::new(YtsProvider::new(http, &config.providers.yts)),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yts" => Ok(ProviderKind::Yts),
            _ => Err(Error::Validation(format!(
                "Unsupported provider '{}'. Supported providers: {}",
                s,
                Self::SUPPORTED.join(", ")
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Yts => write!(f, "YTS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_are_case_insensitive() {
        assert_eq!("YTS".parse::<ProviderKind>().unwrap(), ProviderKind::Yts);
        assert_eq!(" yts ".parse::<ProviderKind>().unwrap(), ProviderKind::Yts);
    }

    #[test]
    fn test_unknown_provider_lists_supported() {
        match "piratebay".parse::<ProviderKind>() {
            Err(Error::Validation(message)) => {
                assert!(message.contains("piratebay"));
                assert!(message.contains("YTS"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_variant_description() {
        let mut variant = TorrentVariant::new("1080p", &"a".repeat(40));
        assert_eq!(variant.describe(), "1080p");
        variant.kind = Some("bluray".into());
        variant.size = Some("1.6 GB".into());
        assert_eq!(variant.describe(), "1080p bluray 1.6 GB");
    }

    #[test]
    fn test_sort_field_names() {
        assert_eq!("rating".parse::<SortField>().unwrap(), SortField::Rating);
        assert_eq!(
            "Download_Count".parse::<SortField>().unwrap(),
            SortField::DownloadCount
        );
        assert!(matches!(
            "popularity".parse::<SortField>(),
            Err(Error::Validation(message)) if message.contains("date_added")
        ));
        assert_eq!(" DESC ".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_browse_query_bounds() {
        assert!(BrowseQuery::default().validate().is_ok());

        for query in [
            BrowseQuery {
                limit: 0,
                ..Default::default()
            },
            BrowseQuery {
                limit: MAX_BROWSE_LIMIT + 1,
                ..Default::default()
            },
            BrowseQuery {
                page: 0,
                ..Default::default()
            },
            BrowseQuery {
                minimum_rating: Some(10),
                ..Default::default()
            },
        ] {
            assert!(matches!(query.validate(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn test_page_count_rounds_up() {
        let page = MoviePage {
            total: 41,
            page: 1,
            limit: 20,
            movies: vec![],
        };
        assert_eq!(page.page_count(), 3);
    }

    #[test]
    fn test_movie_id_display() {
        assert_eq!(MovieId::Imdb("tt1375666".into()).to_string(), "tt1375666");
        assert_eq!(MovieId::Provider("3175".into()).to_string(), "#3175");
    }
}
