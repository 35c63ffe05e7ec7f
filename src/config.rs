//! Configuration for vidstudy.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VIDSTUDY_HOME, VIDSTUDY_DB, VIDSTUDY_LANGUAGES,
//!    GEMINI_API_KEY, GEMINI_MODEL)
//! 2. Config file (.vidstudy/config.yaml)
//! 3. Defaults (~/.vidstudy)
//!
//! Config file discovery:
//! - Searches the starting directory and its parents for .vidstudy/config.yaml
//! - `paths.home` is relative to the .vidstudy/ directory
//! - `database.path` is relative to the project root (parent of .vidstudy/)
//!
//! The resolved configuration is built once at startup and passed down
//! explicitly; nothing here is cached globally.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::gemini;
use crate::adapters::youtube;
use crate::core::{PipelineLimits, RetryPolicy, DEFAULT_LANGUAGES};
use crate::library::password::DEFAULT_ITERATIONS;
use crate::library::pool::DEFAULT_POOL_SIZE;

const CONFIG_DIR: &str = ".vidstudy";
const CONFIG_FILE: &str = "config.yaml";
const DATABASE_FILE: &str = "vidstudy.db";
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub transcripts: TranscriptsConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub limits: Option<PipelineLimits>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .vidstudy/)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file (relative to the project root)
    pub path: Option<String>,
    pub pool_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptsConfig {
    pub languages: Option<Vec<String>>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    pub password_iterations: Option<u32>,
}

/// Resolved configuration with absolute paths
#[derive(Clone)]
pub struct ResolvedConfig {
    /// State directory
    pub home: PathBuf,
    /// SQLite database file
    pub database: PathBuf,
    pub pool_size: usize,
    /// Preferred transcript languages, primary first
    pub languages: Vec<String>,
    pub transcript_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub generation_base_url: String,
    /// Model API key; only required by commands that generate
    pub api_key: Option<String>,
    pub limits: PipelineLimits,
    pub retry: RetryPolicy,
    pub password_iterations: u32,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("home", &self.home)
            .field("database", &self.database)
            .field("pool_size", &self.pool_size)
            .field("languages", &self.languages)
            .field("transcript_base_url", &self.transcript_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("generation_base_url", &self.generation_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("limits", &self.limits)
            .field("retry", &self.retry)
            .field("password_iterations", &self.password_iterations)
            .field("config_file", &self.config_file)
            .finish()
    }
}

impl fmt::Display for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config_file = self
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        let api_key = if self.api_key.is_some() { "set (redacted)" } else { "not set" };

        writeln!(f, "config file:         {}", config_file)?;
        writeln!(f, "home:                {}", self.home.display())?;
        writeln!(f, "database:            {}", self.database.display())?;
        writeln!(f, "pool size:           {}", self.pool_size)?;
        writeln!(f, "languages:           {}", self.languages.join(","))?;
        writeln!(f, "transcript service:  {}", self.transcript_base_url)?;
        writeln!(f, "model:               {}", self.model)?;
        writeln!(f, "temperature:         {}", self.temperature)?;
        writeln!(f, "generation service:  {}", self.generation_base_url)?;
        writeln!(f, "api key:             {}", api_key)?;
        writeln!(f, "max prompt bytes:    {}", self.limits.max_prompt_bytes)?;
        writeln!(f, "max output bytes:    {}", self.limits.max_output_bytes)?;
        writeln!(
            f,
            "timeouts:            transcript {}s, generation {}s",
            self.limits.transcript_timeout_seconds, self.limits.generation_timeout_seconds
        )?;
        write!(f, "retry attempts:      {}", self.retry.max_attempts)
    }
}

impl ResolvedConfig {
    /// Load configuration starting from the current directory and the
    /// process environment
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let default_home = dirs::home_dir()
            .context("Failed to determine home directory")?
            .join(CONFIG_DIR);
        Self::load_from(&cwd, default_home, |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit start directory and environment
    pub fn load_from<E>(start: &Path, default_home: PathBuf, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let config_file = find_config_file(start);
        let config = match config_file {
            Some(ref path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };
        Ok(resolve(config, config_file, default_home, env))
    }

    /// The API key, or an error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .context("GEMINI_API_KEY is not set; it is required to generate content")
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to `base`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Split a comma separated language list, dropping blanks
fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve<E>(
    config: ConfigFile,
    config_file: Option<PathBuf>,
    default_home: PathBuf,
    env: E,
) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    // .vidstudy/ and the project root above it
    let config_dir = config_file.as_deref().and_then(Path::parent);
    let project_root = config_dir.and_then(Path::parent);

    let home = if let Some(env_home) = env("VIDSTUDY_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(dir), Some(home_path)) = (config_dir, config.paths.home.as_deref()) {
        resolve_path(dir, home_path)
    } else {
        default_home
    };

    let database = if let Some(env_db) = env("VIDSTUDY_DB") {
        PathBuf::from(env_db)
    } else if let (Some(root), Some(db_path)) = (project_root, config.database.path.as_deref()) {
        resolve_path(root, db_path)
    } else {
        home.join(DATABASE_FILE)
    };

    let languages = env("VIDSTUDY_LANGUAGES")
        .map(|raw| parse_languages(&raw))
        .or(config.transcripts.languages)
        .filter(|langs| !langs.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect());

    let model = env("GEMINI_MODEL")
        .or(config.generation.model)
        .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());

    ResolvedConfig {
        home,
        database,
        pool_size: config.database.pool_size.unwrap_or(DEFAULT_POOL_SIZE).max(1),
        languages,
        transcript_base_url: config
            .transcripts
            .base_url
            .unwrap_or_else(|| youtube::DEFAULT_BASE_URL.to_string()),
        model,
        temperature: config.generation.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        generation_base_url: config
            .generation
            .base_url
            .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string()),
        api_key: env("GEMINI_API_KEY"),
        limits: config.limits.unwrap_or_default(),
        retry: config.retry.unwrap_or_default(),
        password_iterations: config
            .security
            .password_iterations
            .unwrap_or(DEFAULT_ITERATIONS)
            .max(1),
        config_file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(root: &Path, body: &str) -> PathBuf {
        let dir = root.join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home/.vidstudy");

        let config = ResolvedConfig::load_from(temp.path(), home.clone(), no_env).unwrap();

        assert_eq!(config.home, home);
        assert_eq!(config.database, home.join("vidstudy.db"));
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.languages, vec!["en", "en-US"]);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.password_iterations, 600_000);
        assert!(config.api_key.is_none());
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            temp.path(),
            r#"
version: "1.0"
paths:
  home: ./state
database:
  path: data/study.db
  pool_size: 5
transcripts:
  languages: [de, en]
generation:
  model: gemini-1.5-pro
  temperature: 0.2
limits:
  max_prompt_bytes: 2048
retry:
  max_attempts: 1
security:
  password_iterations: 1000
"#,
        );

        let raw = load_config_file(&path).unwrap();
        assert_eq!(raw.version.as_deref(), Some("1.0"));
        assert_eq!(raw.database.pool_size, Some(5));
        assert_eq!(raw.limits.as_ref().unwrap().max_prompt_bytes, 2048);
        // Unset limit fields keep their defaults
        assert_eq!(raw.limits.as_ref().unwrap().generation_timeout_seconds, 120);

        let config = ResolvedConfig::load_from(temp.path(), PathBuf::from("/unused"), no_env).unwrap();
        assert_eq!(config.home, temp.path().join(".vidstudy").join("./state"));
        assert_eq!(config.database, temp.path().join("data/study.db"));
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.languages, vec!["de", "en"]);
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.password_iterations, 1000);
        assert_eq!(config.config_file, Some(path));
    }

    #[test]
    fn test_config_file_found_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "generation:\n  model: from-file");
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(path));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        write_config(
            temp.path(),
            "generation:\n  model: from-file\ntranscripts:\n  languages: [fr]",
        );

        let env: HashMap<&str, &str> = [
            ("VIDSTUDY_HOME", "/env/home"),
            ("VIDSTUDY_LANGUAGES", "es, es-MX ,"),
            ("GEMINI_MODEL", "from-env"),
            ("GEMINI_API_KEY", "secret-key"),
        ]
        .into_iter()
        .collect();

        let config = ResolvedConfig::load_from(temp.path(), PathBuf::from("/unused"), |k| {
            env.get(k).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.home, PathBuf::from("/env/home"));
        assert_eq!(config.database, PathBuf::from("/env/home/vidstudy.db"));
        assert_eq!(config.languages, vec!["es", "es-MX"]);
        assert_eq!(config.model, "from-env");
        assert_eq!(config.require_api_key().unwrap(), "secret-key");
    }

    #[test]
    fn test_api_key_is_redacted() {
        let temp = TempDir::new().unwrap();
        let config = ResolvedConfig::load_from(temp.path(), temp.path().to_path_buf(), |k| {
            (k == "GEMINI_API_KEY").then(|| "super-secret".to_string())
        })
        .unwrap();

        assert!(!format!("{}", config).contains("super-secret"));
        assert!(!format!("{:?}", config).contains("super-secret"));
        assert!(format!("{}", config).contains("redacted"));
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let temp = TempDir::new().unwrap();
        let config = ResolvedConfig::load_from(temp.path(), temp.path().to_path_buf(), no_env).unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_invalid_yaml_is_reported() {
        let temp = TempDir::new().unwrap();
        write_config(temp.path(), "database: [not, a, map");
        let err = ResolvedConfig::load_from(temp.path(), PathBuf::from("/unused"), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }
}
