use crate::magnet::DEFAULT_TRACKERS;
use crate::quality::{Quality, SelectionStrategy};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_trackers")]
    pub trackers: Vec<String>,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_quality")]
    pub default_quality: String,
    #[serde(default)]
    pub selection: SelectionStrategy,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub output_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub yts: YtsConfig,
    #[serde(default)]
    pub imdb: ImdbConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YtsConfig {
    #[serde(default = "default_yts_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImdbConfig {
    #[serde(default = "default_suggestion_url")]
    pub suggestion_url: String,
    #[serde(default = "default_title_url")]
    pub title_url: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_cast_limit")]
    pub cast_limit: usize,
}

// Default value functions
fn default_quality() -> String {
    "1080p".to_string()
}
fn default_provider() -> String {
    "yts".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    500
}
fn default_backoff_max_ms() -> u64 {
    8_000
}
fn default_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; ytsdl/{})",
        env!("CARGO_PKG_VERSION")
    )
}
fn default_yts_base_url() -> String {
    "https://yts.mx/api/v2".to_string()
}
fn default_suggestion_url() -> String {
    "https://v3.sg.media-imdb.com/suggestion".to_string()
}
fn default_title_url() -> String {
    "https://www.imdb.com/title".to_string()
}
fn default_max_results() -> usize {
    20
}
fn default_cast_limit() -> usize {
    10
}
fn default_trackers() -> Vec<String> {
    DEFAULT_TRACKERS.iter().map(|t| t.to_string()).collect()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_quality: default_quality(),
            selection: SelectionStrategy::default(),
            provider: default_provider(),
            output_dir: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for YtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_yts_base_url(),
        }
    }
}

impl Default for ImdbConfig {
    fn default() -> Self {
        Self {
            suggestion_url: default_suggestion_url(),
            title_url: default_title_url(),
            max_results: default_max_results(),
            cast_limit: default_cast_limit(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trackers: default_trackers(),
            general: GeneralConfig::default(),
            http: HttpConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.http.max_attempts == 0 {
            bail!("http.max_attempts must be greater than 0");
        }

        if self.http.timeout_secs == 0 {
            bail!("http.timeout_secs must be greater than 0");
        }

        if self.http.backoff_base_ms > self.http.backoff_max_ms {
            bail!("http.backoff_base_ms cannot exceed http.backoff_max_ms");
        }

        self.general
            .default_quality
            .parse::<Quality>()
            .context("general.default_quality is invalid")?;

        for (key, url) in [
            ("providers.yts.base_url", &self.providers.yts.base_url),
            (
                "providers.imdb.suggestion_url",
                &self.providers.imdb.suggestion_url,
            ),
            ("providers.imdb.title_url", &self.providers.imdb.title_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                bail!("{} must be an absolute http(s) URL, got '{}'", key, url);
            }
        }

        if let Some(index) = self.trackers.iter().position(|t| t.trim().is_empty()) {
            bail!("trackers[{}] cannot be empty", index);
        }

        Ok(())
    }

    /// Directory where saved torrent files go.
    pub fn output_dir(&self) -> PathBuf {
        self.general
            .output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
    }
}

pub struct ConfigManager {
    config_file: PathBuf,
    loaded_from_disk: bool,
    config: Config,
}

impl ConfigManager {
    /// Load the config from `path`, or from the default location.
    ///
    /// A missing file yields the built-in defaults; nothing is written to disk.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_file()?,
        };

        let (config, loaded_from_disk) = if config_file.exists() {
            (Self::load_config(&config_file)?, true)
        } else if path.is_some() {
            bail!("Config file not found: {:?}", config_file);
        } else {
            (Config::default(), false)
        };

        Ok(Self {
            config_file,
            loaded_from_disk,
            config,
        })
    }

    /// Resolve the config location without reading it.
    ///
    /// Used by commands that only name or create the file, so an explicit
    /// path that does not exist yet is accepted.
    pub fn locate(path: Option<&Path>) -> Result<Self> {
        let config_file = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_file()?,
        };

        Ok(Self {
            config_file,
            loaded_from_disk: false,
            config: Config::default(),
        })
    }

    /// Default config file location for this platform.
    pub fn default_config_file() -> Result<PathBuf> {
        let project_dirs =
            ProjectDirs::from("", "", "ytsdl").context("Failed to determine config directory")?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Get a reference to the current config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the config file path
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Whether the config came from a file rather than built-in defaults
    pub fn loaded_from_disk(&self) -> bool {
        self.loaded_from_disk
    }

    /// Validate the current configuration
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// Write a sample config with every default spelled out.
    pub fn write_sample(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!("{:?} already exists (use --force to overwrite)", path);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        Self::save_config(path, &Config::default())
    }

    /// Render the active config as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.config).context("Failed to serialize config")
    }

    /// Load config from file
    fn load_config(config_file: &Path) -> Result<Config> {
        let content = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file: {:?}", config_file))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_file))?;

        Ok(config)
    }

    /// Save config to file
    fn save_config(config_file: &Path, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(config_file, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_file))?;

        Ok(())
    }
}
