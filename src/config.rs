//! Configuration loading from TOML and environment variables.
//!
//! Config is resolved in this order of precedence (highest wins):
//! 1. Environment variables (`MAGIC_MODEL`, `MAGIC_OLLAMA_URL`, `MAGIC_NUM_GPU`)
//! 2. `~/.config/magic/config.toml` (`[ollama]` table)
//!
//! Model and URL are both required; when neither source provides them the
//! loader fails with [`ConfigError::Missing`], whose display is the
//! sample-config help text below.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Help text shown when no usable configuration exists.
pub const SAMPLE_CONFIG_HELP: &str = "\
Configuration required. Create ~/.config/magic/config.toml:

  [ollama]
  model = \"qwen2.5-coder:7b\"
  url   = \"http://localhost:11434\"

Or set environment variables:

  export MAGIC_MODEL=\"qwen2.5-coder:7b\"
  export MAGIC_OLLAMA_URL=\"http://localhost:11434\"
";

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Ollama model name, e.g. `qwen2.5-coder:7b`.
    pub model: String,
    /// Ollama base URL, e.g. `http://localhost:11434`.
    pub url: String,
    /// Optional override for the number of GPU layers Ollama loads.
    pub num_gpu: Option<u32>,
}

/// On-disk config file shape.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    ollama: OllamaSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OllamaSection {
    model: Option<String>,
    url: Option<String>,
    num_gpu: Option<u32>,
}

/// Default config file location: `~/.config/magic/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("magic").join("config.toml"))
}

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from the --config flag).
pub fn load_config(path_override: Option<&str>) -> Result<Config, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        default_config_path,
    )
}

/// Testable loader core with injected file/env/home sources.
pub(crate) fn load_config_from_sources<FRead, FEnv, FPath>(
    path_override: Option<&str>,
    read_file: FRead,
    env_lookup: FEnv,
    default_path: FPath,
) -> Result<Config, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FPath: Fn() -> Option<PathBuf>,
{
    let file = read_file_config(path_override, &read_file, &default_path)?;

    let mut model = file.ollama.model;
    let mut url = file.ollama.url;
    let mut num_gpu = file.ollama.num_gpu;

    // Env vars override file values.
    if let Some(value) = env_lookup("MAGIC_MODEL") {
        model = Some(value);
    }
    if let Some(value) = env_lookup("MAGIC_OLLAMA_URL") {
        url = Some(value);
    }
    if let Some(value) = env_lookup("MAGIC_NUM_GPU") {
        let parsed = value.parse::<u32>().map_err(|_| {
            ConfigError::Invalid(format!(
                "invalid MAGIC_NUM_GPU value `{value}`: expected non-negative integer"
            ))
        })?;
        num_gpu = Some(parsed);
    }

    let model = model.filter(|v| !v.trim().is_empty());
    let url = url.filter(|v| !v.trim().is_empty());
    match (model, url) {
        (Some(model), Some(url)) => Ok(Config {
            model,
            url,
            num_gpu,
        }),
        _ => Err(ConfigError::Missing),
    }
}

fn read_file_config<FRead, FPath>(
    path_override: Option<&str>,
    read_file: &FRead,
    default_path: &FPath,
) -> Result<FileConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FPath: Fn() -> Option<PathBuf>,
{
    // An explicit --config path must exist; the default location is optional.
    if let Some(path) = path_override {
        let text = read_file(Path::new(path))?;
        return Ok(toml::from_str(&text)?);
    }

    let Some(path) = default_path() else {
        return Ok(FileConfig::default());
    };
    match read_file(&path) {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
        Err(e) => Err(ConfigError::Io(e)),
    }
}
