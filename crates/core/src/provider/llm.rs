use crate::completion::CompletionModel;
use crate::model::ModelProvider;
use crate::provider::{openai, test_provider};
use anyhow::Result;
use tracing::instrument;

#[instrument(skip(model_config))]
pub fn get_completion_llm(
    model_config: crate::model::ModelConfig,
) -> Result<Box<dyn CompletionModel + Send + Sync>> {
    match model_config.provider {
        ModelProvider::Openai => {
            let model = openai::OpenAIChatModel::new(model_config)?;
            Ok(Box::new(model))
        }
        ModelProvider::Test => {
            let model = test_provider::TestProviderModel::new(model_config)?;
            Ok(Box::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelConfig, ModelProvider};
    use std::collections::HashMap;

    #[test]
    fn test_get_completion_llm_openai_provider() {
        let mut settings = HashMap::new();
        settings.insert("base_url".to_string(), "http://localhost:1234".into());
        settings.insert("api_key".to_string(), "sk-dummy".into());
        let model_config = ModelConfig {
            name: "test-openai".to_string(),
            provider: ModelProvider::Openai,
            settings,
        };
        let model = get_completion_llm(model_config);
        assert!(model.is_ok());
    }

    #[test]
    fn test_get_completion_llm_openai_missing_settings() {
        // The openai provider requires base_url and api_key settings.
        let model_config = ModelConfig {
            name: "test-openai".to_string(),
            provider: ModelProvider::Openai,
            settings: HashMap::new(),
        };
        let model = get_completion_llm(model_config);
        assert!(model.is_err());
    }

    #[test]
    fn test_get_completion_llm_test_provider() {
        let model_config = ModelConfig {
            name: "test".to_string(),
            provider: ModelProvider::Test,
            settings: HashMap::new(),
        };
        let model = get_completion_llm(model_config);
        assert!(model.is_ok());
    }
}
