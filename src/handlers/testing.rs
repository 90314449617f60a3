//! In-memory collaborators for handler tests.

use super::Services;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use ytsdl::config::Config;
use ytsdl::error::Error;
use ytsdl::metadata::{MovieDetails, MovieLookup, MovieRecord};
use ytsdl::provider::{
    BrowseQuery, MovieId, MoviePage, ProviderMovie, TorrentProvider, TorrentVariant,
};

pub const HASH_1080: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

pub fn record(identifier: &str, title: &str, year: i32) -> MovieRecord {
    MovieRecord {
        identifier: identifier.into(),
        title: title.into(),
        year: Some(year),
        ..Default::default()
    }
}

pub fn inception() -> ProviderMovie {
    ProviderMovie {
        provider_id: "3175".into(),
        imdb_id: Some("tt1375666".into()),
        title: "Inception".into(),
        year: Some(2010),
        rating: Some(8.8),
        genres: vec!["Action".into()],
        variants: vec![TorrentVariant::new("1080p", HASH_1080)],
    }
}

/// Metadata lookup answering from fixed records, recording every call.
#[derive(Clone, Default)]
pub struct FakeLookup {
    records: Vec<MovieRecord>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeLookup {
    pub fn with_records(records: Vec<MovieRecord>) -> Self {
        Self {
            records,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MovieLookup for FakeLookup {
    fn name(&self) -> &str {
        "fake-imdb"
    }

    async fn search_by_title(&self, title: &str) -> ytsdl::Result<Vec<MovieRecord>> {
        self.calls.lock().unwrap().push(format!("search:{}", title));
        Ok(self.records.clone())
    }

    async fn get_details(&self, identifier: &str) -> ytsdl::Result<MovieDetails> {
        self.calls.lock().unwrap().push(format!("details:{}", identifier));
        let found = self
            .records
            .iter()
            .find(|r| r.identifier == identifier)
            .cloned()
            .unwrap_or_else(|| record(identifier, "Untitled", 2000));
        Ok(MovieDetails {
            record: found,
            plot: Some("A thief who steals corporate secrets.".into()),
        })
    }
}

/// Torrent provider serving one movie (or none), recording every id asked for.
#[derive(Clone, Default)]
pub struct FakeProvider {
    movie: Option<ProviderMovie>,
    requested: Arc<Mutex<Vec<MovieId>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub fn serving(movie: ProviderMovie) -> Self {
        Self {
            movie: Some(movie),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn requested(&self) -> Vec<MovieId> {
        self.requested.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl TorrentProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake-yts"
    }

    async fn movie(&self, id: &MovieId) -> ytsdl::Result<ProviderMovie> {
        self.requested.lock().unwrap().push(id.clone());
        self.movie
            .clone()
            .ok_or_else(|| Error::MovieNotFound(id.to_string()))
    }

    async fn browse(&self, query: &BrowseQuery) -> ytsdl::Result<MoviePage> {
        query.validate()?;
        let movies: Vec<ProviderMovie> = self.movie.iter().cloned().collect();
        Ok(MoviePage {
            total: movies.len() as u64,
            page: query.page,
            limit: query.limit,
            movies,
        })
    }

    async fn fetch_torrent_file(&self, variant: &TorrentVariant) -> ytsdl::Result<Vec<u8>> {
        self.fetched
            .lock()
            .unwrap()
            .push(variant.content_hash.clone());
        Ok(b"d8:announce0:e".to_vec())
    }
}

/// Services over the fakes. The returned list collects every target handed to the opener.
pub fn services(
    lookup: &FakeLookup,
    provider: &FakeProvider,
) -> (Services, Arc<Mutex<Vec<String>>>) {
    let opened: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&opened);

    let services = Services {
        config: Config::default(),
        lookup: Box::new(lookup.clone()),
        provider: Box::new(provider.clone()),
        opener: Box::new(move |target: &str| {
            sink.lock().unwrap().push(target.to_string());
            Ok(())
        }),
    };

    (services, opened)
}
