use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ytsdl")]
#[command(about = "Search movies and fetch magnet links or torrent files from YTS")]
#[command(long_about = "
ytsdl looks movies up on IMDb and resolves them to a YTS torrent of the
requested quality. The result is printed as a magnet link, saved as a
.torrent file, or handed straight to your torrent client.

Examples:
  ytsdl search --movie-name inception            # Details of the best match
  ytsdl search --movie-name inception --list     # Every candidate
  ytsdl search --imdb-id tt1375666               # Details and available qualities
  ytsdl download --imdb-id tt1375666 --quality 4k
  ytsdl download --movie-name inception --fzf --save-torrent --open
  ytsdl browse --genre sci-fi --sort-by rating --limit 10
")]
#[command(version)]
pub struct Cli {
    /// Override config file path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Exactly one way of naming the movie.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct MovieSelector {
    /// IMDb ID of the movie
    #[arg(long, value_name = "ID")]
    #[arg(help = "The IMDb ID of the movie (e.g., 'tt1375666')")]
    pub imdb_id: Option<String>,

    /// Provider movie ID
    #[arg(long = "movieid", value_name = "ID")]
    #[arg(help = "The movie ID specific to the provider (e.g., YTS movie ID)")]
    pub movie_id: Option<String>,

    /// Title to search for
    #[arg(long, value_name = "TITLE")]
    #[arg(help = "The name of the movie to search for")]
    pub movie_name: Option<String>,
}

/// The movie a command operates on, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieTarget {
    Imdb(String),
    Provider(String),
    Title(String),
}

impl MovieSelector {
    pub fn target(&self) -> Option<MovieTarget> {
        if let Some(id) = &self.imdb_id {
            Some(MovieTarget::Imdb(id.clone()))
        } else if let Some(id) = &self.movie_id {
            Some(MovieTarget::Provider(id.clone()))
        } else {
            self.movie_name.clone().map(MovieTarget::Title)
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for movies
    #[command(visible_alias = "s")]
    Search {
        #[command(flatten)]
        movie: MovieSelector,

        /// Torrent provider to check availability on
        #[arg(short, long, value_name = "NAME")]
        #[arg(help = "The movie provider to search from (default from config: YTS)")]
        provider: Option<String>,

        /// List every match
        #[arg(short, long)]
        #[arg(help = "Return a list of movies instead of a specific movie")]
        list: bool,

        /// Pick a match interactively
        #[arg(long)]
        #[arg(help = "Use a fuzzy finder for movie selection")]
        fzf: bool,
    },

    /// Resolve a movie to a magnet link or torrent file
    #[command(visible_alias = "dl")]
    Download {
        #[command(flatten)]
        movie: MovieSelector,

        /// Torrent provider to download from
        #[arg(short, long, value_name = "NAME")]
        provider: Option<String>,

        /// Quality tier
        #[arg(short, long, value_name = "Q")]
        #[arg(help = "The quality to fetch: 720p, 1080p, 2160p/4k (default from config: 1080p)")]
        quality: Option<String>,

        /// Print the magnet link
        #[arg(short, long)]
        #[arg(help = "Print a magnet URL (default when no other action is given)")]
        magnet: bool,

        /// Save the .torrent file
        #[arg(long)]
        #[arg(help = "Save the torrent file to the output directory")]
        save_torrent: bool,

        /// Open in the torrent client
        #[arg(long)]
        #[arg(help = "Open the torrent file (or magnet link) in the default torrent client")]
        open: bool,

        /// Directory for saved torrent files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<String>,

        /// Pick a search match interactively
        #[arg(long)]
        #[arg(help = "Use a fuzzy finder to choose among --movie-name matches")]
        fzf: bool,
    },

    /// Page through the provider's catalogue
    #[command(visible_alias = "b")]
    Browse {
        /// Title, IMDb id, actor or director to filter by
        #[arg(value_name = "TERM")]
        query: Option<String>,

        /// Torrent provider to browse
        #[arg(short, long, value_name = "NAME")]
        provider: Option<String>,

        /// Only movies offered in this quality
        #[arg(short, long, value_name = "Q")]
        quality: Option<String>,

        /// Only movies of this genre
        #[arg(short, long, value_name = "GENRE")]
        genre: Option<String>,

        /// Only movies rated at least this much on IMDb (0-9)
        #[arg(long, value_name = "N")]
        minimum_rating: Option<u8>,

        /// Sort field: title, year, rating, peers, seeds, download_count, like_count, date_added
        #[arg(long, value_name = "FIELD")]
        sort_by: Option<String>,

        /// Sort order: asc or desc
        #[arg(long, value_name = "ORDER")]
        order_by: Option<String>,

        /// Movies per page (1-50)
        #[arg(short, long, default_value_t = 20)]
        limit: u32,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Manage configuration
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the active configuration
    Show,

    /// Print the config file location
    Path,

    /// Validate configuration
    #[command(visible_alias = "check")]
    Validate,

    /// Create sample configuration
    Sample {
        /// Output file (defaults to the config file location)
        #[arg(short, long, value_name = "FILE")]
        output: Option<String>,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

// Helper functions for CLI validation
impl Cli {
    /// Validate CLI arguments and show helpful error messages
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Commands::Search {
                movie, list, fzf, ..
            } => {
                Self::validate_movie(movie)?;
                if *list && *fzf {
                    return Err("Cannot specify both --list and --fzf".to_string());
                }
                if (*list || *fzf) && movie.movie_name.is_none() {
                    return Err("--list and --fzf require --movie-name".to_string());
                }
            }
            Commands::Download {
                movie,
                fzf,
                quality,
                output_dir,
                ..
            } => {
                Self::validate_movie(movie)?;
                if *fzf && movie.movie_name.is_none() {
                    return Err("--fzf requires --movie-name".to_string());
                }
                if quality.as_deref().is_some_and(|q| q.trim().is_empty()) {
                    return Err("Quality cannot be empty".to_string());
                }
                if output_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
                    return Err("Output directory cannot be empty".to_string());
                }
            }
            Commands::Browse {
                quality, genre, ..
            } => {
                if quality.as_deref().is_some_and(|q| q.trim().is_empty()) {
                    return Err("Quality cannot be empty".to_string());
                }
                if genre.as_deref().is_some_and(|g| g.trim().is_empty()) {
                    return Err("Genre cannot be empty".to_string());
                }
            }
            Commands::Config { .. } => {}
        }
        Ok(())
    }

    fn validate_movie(movie: &MovieSelector) -> Result<(), String> {
        match movie.target() {
            Some(MovieTarget::Imdb(id)) if id.trim().is_empty() => {
                Err("IMDb ID cannot be empty".to_string())
            }
            Some(MovieTarget::Provider(id)) if id.trim().is_empty() => {
                Err("Provider movie ID cannot be empty".to_string())
            }
            Some(MovieTarget::Title(title)) if title.trim().is_empty() => {
                Err("Movie name cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("One of --imdb-id, --movieid or --movie-name is required".to_string()),
        }
    }
}
