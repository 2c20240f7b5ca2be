use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{
    assets::{get_config_dir, get_default_config},
    model::ModelConfig,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Generation settings sent with every provider call.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProfileConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 200,
        }
    }
}

/// Resolved relay settings: which model to call and how to frame the
/// conversation before the call.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub model: ModelConfig,
    pub profile: ProfileConfig,
    pub system_prompt: String,
    pub max_message_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_message_chars() -> usize {
    100
}

#[derive(Debug)]
pub struct Config {
    pub models: HashMap<String, ModelConfig>,
    pub profiles: HashMap<String, ProfileConfig>,
    pub relay: RelayConfig,
    pub server: ServerConfig,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrObject<T> {
    String(String),
    Object(T),
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    models: HashMap<String, ModelConfig>,
    #[serde(default)]
    profiles: HashMap<String, ProfileConfig>,
    relay: RawRelayConfig,
    #[serde(default)]
    server: ServerConfig,
}

#[derive(Deserialize, Debug)]
struct RawRelayConfig {
    model: StringOrObject<ModelConfig>,
    #[serde(default)]
    profile: Option<StringOrObject<ProfileConfig>>,
    #[serde(default)]
    system_prompt: String,
    #[serde(default = "default_max_message_chars")]
    max_message_chars: usize,
}

impl RawConfig {
    #[instrument]
    fn to_config(&self) -> Result<Config, ConfigError> {
        let mut models_with_names = HashMap::new();
        for (k, v) in &self.models {
            // Update model name if not set
            let model_name = if v.name.is_empty() {
                k.clone()
            } else {
                v.name.clone()
            };
            let model = ModelConfig {
                name: model_name,
                ..v.clone()
            };
            models_with_names.insert(k.clone(), model);
        }

        let resolve_model =
            |model_entry: &StringOrObject<ModelConfig>| -> Result<ModelConfig, ConfigError> {
                match model_entry {
                    StringOrObject::String(s) => models_with_names
                        .get(s)
                        .cloned()
                        .ok_or_else(|| ConfigError::Config(format!("Model '{s}' not found"))),
                    StringOrObject::Object(m) => Ok(m.clone()),
                }
            };

        let resolve_profile = |profile_entry: &Option<StringOrObject<ProfileConfig>>| -> Result<ProfileConfig, ConfigError> {
            match profile_entry {
                Some(StringOrObject::String(s)) => self.profiles
                    .get(s)
                    .cloned()
                    .ok_or_else(|| ConfigError::Config(format!("Profile '{s}' not found"))),
                Some(StringOrObject::Object(p)) => Ok(p.clone()),
                None => Ok(ProfileConfig::default()),
            }
        };

        let relay_model = resolve_model(&self.relay.model)?;
        let relay_profile = resolve_profile(&self.relay.profile)?;

        Ok(Config {
            models: models_with_names,
            profiles: self.profiles.clone(),
            relay: RelayConfig {
                model: relay_model,
                profile: relay_profile,
                system_prompt: self.relay.system_prompt.clone(),
                max_message_chars: self.relay.max_message_chars,
            },
            server: self.server.clone(),
        })
    }
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), ConfigError> {
    let actual_path = config_path.unwrap_or_else(|| {
        let config_dir = get_config_dir();
        config_dir.join("naradmuni.yml")
    });

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let raw: RawConfig = serde_yaml::from_str(&content)?;
    raw.to_config()
}
