//! Single entry point turning raw article text into a [`ParseResult`].

use std::sync::Arc;

use ainews_core::{load_taxonomy, AppConfig, ConfigError, ExtractedDeal, ParseResult, Taxonomy};

use crate::classifier::CategoryClassifier;
use crate::deals::DealExtractor;
use crate::gazetteer::{Gazetteer, StaticGazetteer};
use crate::scorer::{RelevanceScorer, RelevanceSignals};
use crate::text::{collapse_whitespace, tokenize, truncate_on_word};

pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 500;

/// Combines classifier, scorer and deal extractor over one immutable taxonomy.
///
/// Parsing is pure and holds no mutable state, so one parser can be shared
/// across any number of worker threads.
pub struct ArticleParser {
    taxonomy: Arc<Taxonomy>,
    classifier: CategoryClassifier,
    scorer: RelevanceScorer,
    extractor: DealExtractor,
    summary_max_chars: usize,
}

impl std::fmt::Debug for ArticleParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleParser")
            .field("categories", &self.taxonomy.categories.len())
            .field("summary_max_chars", &self.summary_max_chars)
            .finish_non_exhaustive()
    }
}

impl ArticleParser {
    #[must_use]
    pub fn new(taxonomy: Arc<Taxonomy>, gazetteer: Arc<dyn Gazetteer>) -> Self {
        Self {
            classifier: CategoryClassifier::new(&taxonomy),
            scorer: RelevanceScorer::new(&taxonomy),
            extractor: DealExtractor::new(&taxonomy, gazetteer),
            taxonomy,
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }

    /// Parser over the built-in taxonomy and gazetteer lists.
    #[must_use]
    pub fn with_builtin_taxonomy() -> Self {
        let taxonomy = Arc::new(Taxonomy::default());
        let gazetteer = Arc::new(StaticGazetteer::from_taxonomy(&taxonomy));
        Self::new(taxonomy, gazetteer)
    }

    /// Build a parser from application configuration, loading the taxonomy
    /// override file when `taxonomy_path` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the taxonomy file cannot be read, parsed or
    /// validated.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let taxonomy = match &config.taxonomy_path {
            Some(path) => {
                let taxonomy = load_taxonomy(path)?;
                tracing::info!(
                    path = %path.display(),
                    categories = taxonomy.categories.len(),
                    "loaded taxonomy override"
                );
                taxonomy
            }
            None => Taxonomy::default(),
        };
        let taxonomy = Arc::new(taxonomy);
        let gazetteer = Arc::new(StaticGazetteer::from_taxonomy(&taxonomy));
        Ok(Self::new(taxonomy, gazetteer).with_summary_max_chars(config.summary_max_chars))
    }

    #[must_use]
    pub fn with_summary_max_chars(mut self, max_chars: usize) -> Self {
        self.summary_max_chars = max_chars.max(1);
        self
    }

    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Derive relevance, categories, deals and a summary from one article.
    ///
    /// Never fails: empty or malformed input degrades to a zero-relevance
    /// result. Deterministic for identical input.
    #[must_use]
    pub fn parse(&self, url: &str, title: &str, content: &str) -> ParseResult {
        if content.trim().is_empty() {
            tracing::debug!(url, "empty article content, zero relevance");
            return ParseResult {
                relevance_score: 0.0,
                categories: Vec::new(),
                is_deal_news: false,
                deals: Vec::new(),
                summary: truncate_on_word(&collapse_whitespace(title), self.summary_max_chars),
            };
        }

        let title_tokens = tokenize(title);
        let content_tokens = tokenize(content);

        let categories = self.classifier.classify_tokens(&title_tokens, &content_tokens);
        let analysis = self
            .extractor
            .analyze(title, content, &title_tokens, &content_tokens);

        let signals = RelevanceSignals {
            title_core_term: self.scorer.title_signal(&title_tokens),
            body_density: self.scorer.density_signal(&content_tokens),
            has_categories: !categories.is_empty(),
            deal_signal: analysis.deal_signal,
            amount_found: analysis.amount_found,
        };
        let relevance_score = signals.score();

        if categories.is_empty() && analysis.deals.is_empty() {
            tracing::debug!(
                url,
                relevance = relevance_score,
                "no categories or deals extracted"
            );
        }

        ParseResult {
            relevance_score,
            is_deal_news: analysis.is_deal_news(),
            summary: self.summary(content, &analysis.deals),
            categories,
            deals: analysis.deals,
        }
    }

    fn summary(&self, content: &str, deals: &[ExtractedDeal]) -> String {
        let prefix = deals.first().and_then(|deal| {
            let company = deal.company_name.as_deref()?;
            let raw = deal.amount_text.as_deref()?;
            Some(match deal.round_type {
                Some(round) => format!("{company} raised {raw} ({round}). "),
                None => format!("{company} raised {raw}. "),
            })
        });

        let text = match prefix {
            Some(prefix) => prefix + content,
            None => content.to_string(),
        };
        truncate_on_word(&collapse_whitespace(&text), self.summary_max_chars)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use ainews_core::{Environment, RoundType};

    use super::*;

    const OPENAI_TITLE: &str = "OpenAI Raises $6.6B in Series C";
    const OPENAI_BODY: &str = "OpenAI has raised $6.6 billion in a Series C round led by \
Thrive Capital, with participation from Microsoft, Nvidia and SoftBank. The ChatGPT maker \
is now valued at $157 billion.";

    fn parser() -> ArticleParser {
        ArticleParser::with_builtin_taxonomy()
    }

    #[test]
    fn openai_scenario() {
        let result = parser().parse("https://example.com/openai", OPENAI_TITLE, OPENAI_BODY);

        assert!(result.relevance_score >= 0.8, "relevance {}", result.relevance_score);
        assert!(result.has_category("generative_ai"));
        assert!(result.is_deal_news);
        assert_eq!(result.deals.len(), 1);

        let deal = &result.deals[0];
        assert_eq!(deal.company_name.as_deref(), Some("OpenAI"));
        assert!((deal.amount.unwrap() - 6_600_000_000.0).abs() < 1.0);
        assert_eq!(deal.round_type, Some(RoundType::SeriesC));
        assert!(deal.investors.iter().any(|i| i == "Thrive Capital"));
        assert!(deal.investors.iter().any(|i| i == "Microsoft"));
    }

    #[test]
    fn weather_scenario() {
        let result = parser().parse(
            "https://example.com/weather",
            "Weather report for Monday",
            "Sunny skies ahead",
        );
        assert!(result.relevance_score < 0.3);
        assert!(result.categories.is_empty());
        assert!(result.deals.is_empty());
        assert!(!result.is_deal_news);
    }

    #[test]
    fn empty_content_degrades_to_title_summary() {
        let result = parser().parse("u", "OpenAI  ships   GPT", "   \n ");
        assert_eq!(result.relevance_score, 0.0);
        assert!(result.categories.is_empty());
        assert!(!result.is_deal_news);
        assert!(result.deals.is_empty());
        assert_eq!(result.summary, "OpenAI ships GPT");
    }

    #[test]
    fn relevance_stays_in_bounds_for_odd_inputs() {
        let p = parser();
        let long_ai = "AI machine learning LLM neural GPU robot ".repeat(500);
        let inputs = [
            ("", ""),
            ("AI AI AI", "AI"),
            ("$$$ €€€", "1,2,3,4 $ $ $ B M K"),
            ("OpenAI raises $1B Series A IPO acquisition", long_ai.as_str()),
            ("日本語のタイトル", "本文 ¥100M 資金調達"),
        ];
        for (title, content) in inputs {
            let r = p.parse("u", title, content);
            assert!(
                (0.0..=1.0).contains(&r.relevance_score),
                "{title:?} scored {}",
                r.relevance_score
            );
        }
    }

    #[test]
    fn plain_ai_article_is_not_deal_news() {
        let result = parser().parse(
            "u",
            "How transformers changed natural language processing",
            "Researchers explain attention, embeddings and why large language model \
             inference needs GPUs.",
        );
        assert!(!result.is_deal_news);
        assert!(result.deals.is_empty());
        assert!(result.has_category("generative_ai"));
        assert!(result.has_category("nlp"));
        assert!(result.has_category("ai_infrastructure"));
    }

    #[test]
    fn summary_leads_with_the_deal() {
        let result = parser().parse("u", OPENAI_TITLE, OPENAI_BODY);
        assert!(
            result
                .summary
                .starts_with("OpenAI raised $6.6B (Series C). OpenAI has raised"),
            "summary: {}",
            result.summary
        );
    }

    #[test]
    fn summary_is_capped_on_a_word_boundary() {
        let body = "word ".repeat(400);
        let result = parser()
            .with_summary_max_chars(50)
            .parse("u", "AI news", &body);
        assert!(result.summary.chars().count() <= 50);
        assert!(result.summary.ends_with("word…"));
    }

    #[test]
    fn parsing_is_deterministic() {
        let p = parser();
        let a = p.parse("u", OPENAI_TITLE, OPENAI_BODY);
        let b = p.parse("u", OPENAI_TITLE, OPENAI_BODY);
        assert_eq!(a, b);
    }

    #[test]
    fn parse_result_serializes_for_collaborators() {
        let result = parser().parse("u", OPENAI_TITLE, OPENAI_BODY);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["deals"][0]["round_type"], "Series C");
        assert_eq!(json["deals"][0]["company_name"], "OpenAI");
        assert_eq!(json["is_deal_news"], true);
    }

    #[test]
    fn parser_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ArticleParser>();

        let p = Arc::new(parser());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&p);
                std::thread::spawn(move || p.parse("u", OPENAI_TITLE, OPENAI_BODY).deals.len())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 1);
        }
    }

    fn app_config(taxonomy_path: Option<PathBuf>) -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/unused".to_string(),
            env: Environment::Test,
            log_level: "debug".to_string(),
            db_max_connections: 1,
            db_min_connections: 1,
            db_acquire_timeout_secs: 1,
            taxonomy_path,
            summary_max_chars: 120,
            ingest_concurrency: 1,
        }
    }

    #[test]
    fn from_app_config_uses_builtin_taxonomy_by_default() {
        let p = ArticleParser::from_app_config(&app_config(None)).unwrap();
        assert_eq!(p.taxonomy().categories.len(), 9);
        assert_eq!(p.summary_max_chars, 120);
    }

    #[test]
    fn from_app_config_loads_override_file() {
        let path = PathBuf::from(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/taxonomy.example.yaml"
        ));
        let p = ArticleParser::from_app_config(&app_config(Some(path))).unwrap();
        assert_eq!(p.taxonomy().categories.len(), 9);
        assert!(p.taxonomy().companies.len() < Taxonomy::default().companies.len());
    }

    #[test]
    fn from_app_config_reports_missing_taxonomy_file() {
        let err = ArticleParser::from_app_config(&app_config(Some(PathBuf::from(
            "/nonexistent/taxonomy.yaml",
        ))))
        .unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
    }
}
