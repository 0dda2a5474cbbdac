//! Text-analysis engine for AI news articles.
//!
//! Amount parsing, keyword classification, relevance scoring and deal
//! extraction, combined behind [`ArticleParser`]. Parsing itself does no I/O,
//! keeps no global state and never returns an error.

pub mod amount;
pub mod article;
pub mod classifier;
pub mod deals;
pub mod gazetteer;
pub mod scorer;

mod text;

pub use amount::{parse_amounts, ParsedAmount, MAX_AMOUNT};
pub use article::{ArticleParser, DEFAULT_SUMMARY_MAX_CHARS};
pub use classifier::CategoryClassifier;
pub use deals::{DealAnalysis, DealExtractor};
pub use gazetteer::{EntityKind, Gazetteer, Mention, StaticGazetteer};
pub use scorer::{RelevanceScorer, RelevanceSignals};
