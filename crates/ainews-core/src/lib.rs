//! Shared domain types, configuration and fixed keyword tables for the AI news
//! intelligence workspace.

pub mod app_config;
pub mod article;
pub mod config;
pub mod taxonomy;
pub mod url;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use article::{
    CategoryWeight, ExtractedDeal, NewArticle, ParseResult, RoundType, UrlStatus,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use taxonomy::{load_taxonomy, CategoryDef, GazetteerEntry, Taxonomy};
pub use url::{normalize_url, url_hash};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read taxonomy file {path}: {source}")]
    TaxonomyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy file: {0}")]
    TaxonomyFileParse(#[from] serde_yaml::Error),

    #[error("taxonomy validation failed: {0}")]
    Validation(String),
}
