use std::env;

use commentator::{CommentaryConfig, CommentaryError};

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub commentary: CommentaryConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, CommentaryError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            commentary: CommentaryConfig::from_env()?,
        })
    }
}
