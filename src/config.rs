use std::env;
use std::path::PathBuf;

use crate::recipe_generator::{DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};

pub const PRIMARY_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const FALLBACK_API_KEY_VAR: &str = "API_KEY";
pub const DEFAULT_DATA_DIR: &str = ".chefgenius";

/// Runtime settings gathered from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Environment variable the API key is read from at request time.
    pub api_key_env_var: String,
    pub data_dir: PathBuf,
    pub text_model: String,
    pub image_model: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let api_key_env_var = if get(PRIMARY_API_KEY_VAR).is_none() && get(FALLBACK_API_KEY_VAR).is_some() {
            FALLBACK_API_KEY_VAR
        } else {
            PRIMARY_API_KEY_VAR
        };
        Self {
            api_key_env_var: api_key_env_var.to_string(),
            data_dir: get("CHEFGENIUS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            text_model: get("CHEFGENIUS_TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: get("CHEFGENIUS_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
        }
    }

    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.data_dir = dir;
        }
        self
    }
}
