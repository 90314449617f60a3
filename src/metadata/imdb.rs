use super::{MovieDetails, MovieLookup, MovieRecord, normalize_imdb_id};
use crate::config::ImdbConfig;
use crate::error::Error;
use crate::http::{HttpClient, decode_json};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

const PROVIDER_NAME: &str = "IMDb";

static LD_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script[^>]*type="application/ld\+json"[^>]*>(.*?)</script>"#)
        .expect("JSON-LD pattern is valid")
});

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default)]
    d: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    #[serde(default)]
    id: String,
    #[serde(default, rename = "l")]
    title: Option<String>,
    #[serde(default, rename = "y")]
    year: Option<i32>,
    /// Comma-separated headline credits.
    #[serde(default, rename = "s")]
    credits: Option<String>,
    #[serde(default)]
    qid: Option<String>,
}

impl Suggestion {
    fn is_title(&self) -> bool {
        self.id.starts_with("tt") && self.qid.as_deref() != Some("videoGame")
    }

    fn into_record(self) -> Option<MovieRecord> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        let cast = self
            .credits
            .map(|credits| {
                credits
                    .split(", ")
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(MovieRecord {
            identifier: self.id,
            title,
            year: self.year,
            cast,
            ..Default::default()
        })
    }
}

/// A JSON-LD field that may be a single value or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct LdMovie {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "datePublished")]
    date_published: Option<String>,
    #[serde(default, rename = "aggregateRating")]
    aggregate_rating: Option<LdRating>,
    #[serde(default)]
    genre: OneOrMany<String>,
    #[serde(default)]
    actor: OneOrMany<LdPerson>,
    #[serde(default)]
    director: OneOrMany<LdPerson>,
}

#[derive(Debug, Deserialize)]
struct LdRating {
    #[serde(default, rename = "ratingValue")]
    rating_value: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct LdPerson {
    #[serde(default)]
    name: Option<String>,
}

fn unescape_html(text: &str) -> String {
    text.replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn names(people: OneOrMany<LdPerson>, limit: usize) -> Vec<String> {
    people
        .into_vec()
        .into_iter()
        .filter_map(|person| person.name)
        .map(|name| unescape_html(&name))
        .take(limit)
        .collect()
}

/// Pull the structured movie data out of an IMDb title page.
fn parse_title_page(
    identifier: &str,
    html: &str,
    cast_limit: usize,
) -> crate::Result<MovieDetails> {
    let lookup_failed = |message: String| Error::LookupFailed {
        provider: PROVIDER_NAME.to_string(),
        message,
    };

    let json = LD_JSON
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| lookup_failed(format!("no structured data on page for {}", identifier)))?;

    let movie: LdMovie = decode_json(identifier, json).map_err(|e| lookup_failed(e.to_string()))?;

    let year = movie
        .date_published
        .as_deref()
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok());

    let record = MovieRecord {
        identifier: identifier.to_string(),
        title: movie
            .name
            .map(|name| unescape_html(&name))
            .unwrap_or_else(|| "Unknown Title".to_string()),
        year,
        rating: movie.aggregate_rating.and_then(|r| r.rating_value),
        genres: movie.genre.into_vec(),
        cast: names(movie.actor, cast_limit),
        directors: names(movie.director, usize::MAX),
    };

    Ok(MovieDetails {
        record,
        plot: movie.description.map(|d| unescape_html(&d)),
    })
}

/// Movie lookup backed by IMDb's suggestion endpoint and title pages.
pub struct ImdbLookup {
    http: HttpClient,
    config: ImdbConfig,
}

impl ImdbLookup {
    pub fn new(http: HttpClient, config: &ImdbConfig) -> Self {
        Self {
            http,
            config: config.clone(),
        }
    }

    fn suggestion_url(&self, query: &str) -> crate::Result<String> {
        let bucket = query
            .chars()
            .next()
            .filter(char::is_ascii_alphanumeric)
            .unwrap_or('x')
            .to_string();

        let mut url = Url::parse(&self.config.suggestion_url).map_err(|e| {
            Error::Validation(format!(
                "Invalid IMDb suggestion URL '{}': {}",
                self.config.suggestion_url, e
            ))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                Error::Validation(format!(
                    "IMDb suggestion URL '{}' cannot take a path",
                    self.config.suggestion_url
                ))
            })?
            .pop_if_empty()
            .push(&bucket)
            .push(&format!("{}.json", query));

        Ok(url.to_string())
    }

    fn title_url(&self, identifier: &str) -> String {
        format!(
            "{}/{}/",
            self.config.title_url.trim_end_matches('/'),
            identifier
        )
    }
}

#[async_trait]
impl MovieLookup for ImdbLookup {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search_by_title(&self, title: &str) -> crate::Result<Vec<MovieRecord>> {
        let query = title.trim().to_lowercase();
        if query.is_empty() {
            return Err(Error::Validation("Movie title cannot be empty".to_string()));
        }

        let url = self.suggestion_url(&query)?;
        debug!("Searching IMDb for '{}'", query);

        let response: SuggestionResponse = self
            .http
            .get_json(&url, &[])
            .await
            .map_err(|f| Error::from_failure(PROVIDER_NAME, f))?;

        let total = response.d.len();
        let records: Vec<MovieRecord> = response
            .d
            .into_iter()
            .filter(Suggestion::is_title)
            .filter_map(Suggestion::into_record)
            .take(self.config.max_results)
            .collect();

        debug!("IMDb returned {} suggestion(s), {} title(s)", total, records.len());
        Ok(records)
    }

    async fn get_details(&self, identifier: &str) -> crate::Result<MovieDetails> {
        let identifier = normalize_imdb_id(identifier)?;
        let url = self.title_url(&identifier);

        let html = self
            .http
            .get_text(&url, &[])
            .await
            .map_err(|f| Error::from_detail_failure(PROVIDER_NAME, &identifier, f))?;

        let details = parse_title_page(&identifier, &html, self.config.cast_limit);
        if let Err(e) = &details {
            warn!("Could not read IMDb title page {}: {}", url, e);
        }
        details
    }
}
