pub mod imdb;

use crate::error::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use imdb::ImdbLookup;

/// A movie as known to the metadata provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub identifier: String,
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub genres: Vec<String>,
    pub cast: Vec<String>,
    pub directors: Vec<String>,
}

impl MovieRecord {
    /// "Title (Year)" or just the title.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// A [`MovieRecord`] with the extended fields of a detail lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub record: MovieRecord,
    pub plot: Option<String>,
}

/// Resolves titles and identifiers against a metadata provider.
///
/// An empty search result means "no matches"; provider failures are always errors.
#[async_trait]
pub trait MovieLookup: Send + Sync {
    fn name(&self) -> &str;

    async fn search_by_title(&self, title: &str) -> crate::Result<Vec<MovieRecord>>;

    async fn get_details(&self, identifier: &str) -> crate::Result<MovieDetails>;
}

/// Normalise an IMDb title identifier to `tt` followed by at least seven digits.
///
/// Bare digits are accepted and zero-padded, e.g. `"111161"` becomes `"tt0111161"`.
pub fn normalize_imdb_id(input: &str) -> crate::Result<String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("tt")
        .or_else(|| trimmed.strip_prefix("TT"))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "Invalid IMDb ID '{}': expected something like tt1375666",
            input
        )));
    }

    Ok(format!("tt{:0>7}", digits))
}
