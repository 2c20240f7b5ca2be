use anyhow::{Context, Result};
use naradmuni_core::completion::{ChatMessage, SenderType};
use naradmuni_core::config::{Config, RelayConfig};
use naradmuni_core::relay::{ChatRelay, ChatRequest};

pub async fn execute(message: Vec<String>, model: Option<String>, config: &Config) -> Result<()> {
    let message = message.join(" ");
    let relay_config = if let Some(model_name) = model {
        let model = config
            .models
            .get(model_name.as_str())
            .cloned()
            .context(format!("Model '{model_name}' not found in config."))?;
        RelayConfig {
            model,
            ..config.relay.clone()
        }
    } else {
        config.relay.clone()
    };

    let relay = ChatRelay::new(&relay_config)?;
    let request = ChatRequest {
        messages: vec![ChatMessage {
            text: message,
            sender: SenderType::User,
        }],
    };

    let response = relay.respond(&request).await?;
    println!("{}", response.message.text);
    Ok(())
}
