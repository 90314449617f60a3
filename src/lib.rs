pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod magnet;
pub mod metadata;
pub mod provider;
pub mod quality;
pub mod resolver;

// Re-export commonly used types for easier access in tests
pub use config::{Config, ConfigManager};
pub use error::Error;
pub use http::{HttpClient, RetryPolicy};
pub use magnet::{DEFAULT_TRACKERS, InfoHash, MagnetLink};
pub use metadata::{ImdbLookup, MovieDetails, MovieLookup, MovieRecord};
pub use provider::{
    BrowseQuery, MovieId, MoviePage, ProviderKind, ProviderMovie, SortField, SortOrder,
    TorrentProvider, TorrentVariant,
};
pub use quality::{Quality, SelectionStrategy};
pub use resolver::{Resolution, TorrentResolver};

pub type Result<T> = std::result::Result<T, Error>;
