use once_cell::sync::Lazy;
use std::path::PathBuf;

// DEFAULT_CONFIG_DIR is a fallback, as get_config_dir checks XDG_CONFIG_HOME first
static DEFAULT_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .map(|p| p.join("naradmuni"))
        .unwrap_or_else(|| PathBuf::from("~/.config/naradmuni"))
});

pub fn get_config_dir() -> PathBuf {
    // Check XDG_CONFIG_HOME first, then fall back to default
    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config_home).join("naradmuni")
    } else {
        DEFAULT_CONFIG_DIR.clone()
    }
}

pub fn get_default_config() -> String {
    include_str!("../data/config.yml").to_string()
}
