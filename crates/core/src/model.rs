use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "type")]
    pub provider: ModelProvider,
    #[serde(default, flatten)]
    pub settings: HashMap<String, serde_yaml::Value>,
}

impl ModelConfig {
    /// Deserialize a single value from the flattened settings map.
    pub fn get_setting<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.settings
            .get(key)
            .and_then(|value| serde_yaml::from_value(value.clone()).ok())
    }
}

/// Supported model provider integrations (serialized as lowercase strings).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Openai,
    Test,
}

impl From<ModelProvider> for String {
    fn from(val: ModelProvider) -> Self {
        val.as_str().into()
    }
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match &self {
            ModelProvider::Openai => "openai",
            ModelProvider::Test => "test",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_type_alias() {
        let yaml = r#"
name: llama-3.1-8b-instant
type: openai
base_url: https://api.groq.com/openai/v1
api_key: env:GROQ_API_KEY
"#;
        let config: ModelConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "llama-3.1-8b-instant");
        assert_eq!(config.provider, ModelProvider::Openai);
        assert_eq!(config.settings.len(), 2);
    }

    #[test]
    fn test_get_setting() {
        let yaml = r#"
name: test-model
type: test
response_text: Hello
timeout_ms: 5000
"#;
        let config: ModelConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.get_setting::<String>("response_text"),
            Some("Hello".to_string())
        );
        assert_eq!(config.get_setting::<u64>("timeout_ms"), Some(5000));
        assert_eq!(config.get_setting::<String>("missing"), None);
    }
}
