use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote document-store API.
    pub api_base_url: String,
    /// Directory for guest-mode JSON storage.
    pub data_dir: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("TANGOCHO_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".to_string());

        let data_dir = std::env::var("TANGOCHO_DATA_DIR")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("tangocho")))
            .unwrap_or_else(|| PathBuf::from("./data"));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            api_base_url,
            data_dir,
            log_level,
        }
    }
}
