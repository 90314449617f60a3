use super::{BrowseQuery, MovieId, MoviePage, ProviderMovie, TorrentProvider, TorrentVariant};
use crate::config::YtsConfig;
use crate::error::Error;
use crate::http::HttpClient;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

const PROVIDER_NAME: &str = "YTS";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    status_message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MovieDetailsData {
    #[serde(default)]
    movie: Option<RawMovie>,
}

#[derive(Debug, Deserialize)]
struct MovieListData {
    #[serde(default)]
    movie_count: Option<u64>,
    #[serde(default)]
    limit: Option<u32>,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    movies: Option<Vec<RawMovie>>,
}

// Every field is optional: YTS sends `null` as readily as it omits a key.
#[derive(Debug, Deserialize)]
struct RawMovie {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    imdb_code: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    torrents: Option<Vec<RawTorrent>>,
}

#[derive(Debug, Deserialize)]
struct RawTorrent {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    seeds: Option<u32>,
    #[serde(default)]
    peers: Option<u32>,
}

impl RawTorrent {
    /// `None` for entries without a content hash; they cannot become a magnet link.
    fn into_variant(self) -> Option<TorrentVariant> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let Some(hash) = non_empty(self.hash) else {
            warn!(
                "Skipping YTS torrent without a hash (quality {:?})",
                self.quality
            );
            return None;
        };

        Some(TorrentVariant {
            quality_label: self.quality.unwrap_or_default(),
            content_hash: hash,
            url: non_empty(self.url),
            kind: non_empty(self.kind),
            size: non_empty(self.size),
            seeds: self.seeds,
            peers: self.peers,
        })
    }
}

impl RawMovie {
    /// `None` for placeholder records, which YTS marks with a missing or zero id.
    fn into_movie(self) -> Option<ProviderMovie> {
        let id = self.id.filter(|id| *id != 0)?;

        let variants = self
            .torrents
            .unwrap_or_default()
            .into_iter()
            .filter_map(RawTorrent::into_variant)
            .collect();

        Some(ProviderMovie {
            provider_id: id.to_string(),
            imdb_id: self.imdb_code.filter(|code| !code.is_empty()),
            title: self
                .title
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| "Unknown Title".to_string()),
            year: self.year.filter(|year| *year > 0),
            rating: self.rating,
            genres: self.genres.unwrap_or_default(),
            variants,
        })
    }
}

/// Client for the YTS v2 REST API.
pub struct YtsProvider {
    http: HttpClient,
    base_url: String,
}

impl YtsProvider {
    pub fn new(http: HttpClient, config: &YtsConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    /// Site-level download link for a hash, used when a variant carries no URL.
    fn fallback_torrent_url(&self, hash: &str) -> crate::Result<String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::Validation(format!("Invalid YTS base URL '{}': {}", self.base_url, e))
        })?;
        url.set_path(&format!("/torrent/download/{}", hash));
        url.set_query(None);
        Ok(url.to_string())
    }
}

/// Unwrap the payload of an `ok` envelope.
fn into_data<T>(envelope: Envelope<T>) -> crate::Result<Option<T>> {
    if !envelope.status.eq_ignore_ascii_case("ok") {
        return Err(Error::LookupFailed {
            provider: PROVIDER_NAME.to_string(),
            message: envelope
                .status_message
                .unwrap_or_else(|| format!("status '{}'", envelope.status)),
        });
    }
    Ok(envelope.data)
}

/// Turn a decoded `movie_details` envelope into a provider movie.
fn into_provider_movie(
    envelope: Envelope<MovieDetailsData>,
    id: &MovieId,
) -> crate::Result<ProviderMovie> {
    into_data(envelope)?
        .and_then(|data| data.movie)
        .and_then(RawMovie::into_movie)
        .ok_or_else(|| Error::MovieNotFound(id.to_string()))
}

/// Turn a decoded `list_movies` envelope into a page; no matches is an empty page.
fn into_movie_page(
    envelope: Envelope<MovieListData>,
    query: &BrowseQuery,
) -> crate::Result<MoviePage> {
    let Some(data) = into_data(envelope)? else {
        return Ok(MoviePage {
            total: 0,
            page: query.page,
            limit: query.limit,
            movies: Vec::new(),
        });
    };

    let raw = data.movies.unwrap_or_default();
    let listed = raw.len();
    let movies: Vec<ProviderMovie> = raw.into_iter().filter_map(RawMovie::into_movie).collect();
    if movies.len() < listed {
        warn!(
            "Skipped {} YTS listing entries without an id",
            listed - movies.len()
        );
    }

    Ok(MoviePage {
        total: data.movie_count.unwrap_or(movies.len() as u64),
        page: data.page_number.unwrap_or(query.page),
        limit: data.limit.unwrap_or(query.limit),
        movies,
    })
}

/// Query parameters for `list_movies.json`; unset filters are left out.
fn list_params(query: &BrowseQuery) -> Vec<(&'static str, String)> {
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut params = vec![
        ("limit", query.limit.to_string()),
        ("page", query.page.to_string()),
    ];
    if let Some(term) = text(&query.query_term) {
        params.push(("query_term", term));
    }
    if let Some(quality) = query.quality {
        params.push(("quality", quality.to_string()));
    }
    if let Some(genre) = text(&query.genre) {
        params.push(("genre", genre));
    }
    if let Some(rating) = query.minimum_rating {
        params.push(("minimum_rating", rating.to_string()));
    }
    if let Some(field) = query.sort_by {
        params.push(("sort_by", field.as_str().to_string()));
    }
    if let Some(order) = query.order_by {
        params.push(("order_by", order.as_str().to_string()));
    }
    params
}

#[async_trait]
impl TorrentProvider for YtsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn movie(&self, id: &MovieId) -> crate::Result<ProviderMovie> {
        let key = if id.is_imdb() { "imdb_id" } else { "movie_id" };
        let url = self.endpoint("movie_details.json");
        debug!("Fetching YTS details for {}", id);

        let envelope: Envelope<MovieDetailsData> = self
            .http
            .get_json(&url, &[(key, id.value().to_string())])
            .await
            .map_err(|f| Error::from_detail_failure(PROVIDER_NAME, &id.to_string(), f))?;

        let movie = into_provider_movie(envelope, id)?;
        info!(
            "YTS lists {} variant(s) for {}",
            movie.variants.len(),
            movie.display_title()
        );
        Ok(movie)
    }

    async fn browse(&self, query: &BrowseQuery) -> crate::Result<MoviePage> {
        query.validate()?;

        let url = self.endpoint("list_movies.json");
        let params = list_params(query);
        debug!("Listing YTS movies with {:?}", params);

        let envelope: Envelope<MovieListData> = self
            .http
            .get_json(&url, &params)
            .await
            .map_err(|f| Error::from_failure(PROVIDER_NAME, f))?;

        into_movie_page(envelope, query)
    }

    async fn fetch_torrent_file(&self, variant: &TorrentVariant) -> crate::Result<Vec<u8>> {
        let url = match &variant.url {
            Some(url) => url.clone(),
            None => self.fallback_torrent_url(&variant.content_hash)?,
        };

        debug!("Downloading torrent file from {}", url);
        // A missing .torrent is a broken listing, not a missing movie.
        let bytes = self
            .http
            .get_bytes(&url)
            .await
            .map_err(|f| Error::from_failure(PROVIDER_NAME, f))?;

        if bytes.is_empty() {
            return Err(Error::LookupFailed {
                provider: PROVIDER_NAME.to_string(),
                message: format!("empty torrent file at {}", url),
            });
        }

        Ok(bytes)
    }
}
