use std::env;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::llm::{OpenAiClient, DEFAULT_ENDPOINT, DEFAULT_MODEL};

pub const DEFAULT_CATALOG: &str = "products.json";
pub const DEFAULT_LOG_FILE: &str = "routine-picker.log";

/// Settings gathered from the command line and the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub catalog: String,
    pub log_file: PathBuf,
}

impl Config {
    /// Command-line flags win; otherwise fall back to environment variables
    /// (already loaded from `.env`), then to built-in defaults.
    pub fn from_env_and_cli(cli: &Cli) -> Self {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = cli
            .model
            .clone()
            .or_else(|| env::var("ROUTINE_PICKER_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = env::var("ROUTINE_PICKER_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Self {
            api_key,
            model,
            endpoint,
            catalog: cli.catalog.clone(),
            log_file: cli.log_file.clone(),
        }
    }

    pub fn chat_client(&self) -> OpenAiClient {
        OpenAiClient::new(self.api_key.clone())
            .with_model(&self.model)
            .with_endpoint(&self.endpoint)
    }
}
