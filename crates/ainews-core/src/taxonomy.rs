//! Fixed keyword tables: the nine-category taxonomy, core AI vocabulary, deal
//! vocabulary and the known company/investor gazetteer.
//!
//! A [`Taxonomy`] is built once (from the built-in tables or a YAML file) and
//! handed to the parser explicitly; nothing here is global state.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Categories scoring at or below this are dropped from parse results.
pub const DEFAULT_INCLUSION_THRESHOLD: f32 = 0.05;

/// `(name, description, base weight, keywords)`
const CATEGORIES: &[(&str, &str, f32, &[&str])] = &[
    (
        "generative_ai",
        "Generative models: LLMs, diffusion, text and image generation",
        1.0,
        &[
            "generative ai",
            "openai",
            "gpt",
            "chatgpt",
            "claude",
            "gemini",
            "grok",
            "llm",
            "large language model",
            "text generation",
            "image generation",
            "diffusion",
            "transformer",
            "foundation model",
        ],
    ),
    (
        "machine_learning",
        "Core machine learning and deep learning",
        0.9,
        &[
            "machine learning",
            "ml",
            "neural network",
            "deep learning",
            "training data",
            "model training",
            "supervised learning",
            "unsupervised learning",
            "reinforcement learning",
        ],
    ),
    (
        "computer_vision",
        "Image and video understanding",
        0.85,
        &[
            "computer vision",
            "object detection",
            "image recognition",
            "video analysis",
            "facial recognition",
            "cv model",
            "vision transformer",
        ],
    ),
    (
        "nlp",
        "Natural language and speech processing",
        0.85,
        &[
            "natural language",
            "nlp",
            "language model",
            "text analysis",
            "sentiment analysis",
            "speech recognition",
            "transcription",
            "voice assistant",
        ],
    ),
    (
        "ai_infrastructure",
        "Compute, serving and data infrastructure for AI",
        1.0,
        &[
            "gpu",
            "gpus",
            "tpu",
            "accelerator",
            "inference",
            "model serving",
            "mlops",
            "cloud compute",
            "distributed training",
            "vector database",
            "embedding",
            "embeddings",
            "data center",
            "data centers",
        ],
    ),
    (
        "ai_agents",
        "Autonomous and agentic systems",
        1.0,
        &[
            "ai agent",
            "ai agents",
            "autonomous agent",
            "autonomous agents",
            "agentic",
            "agent engineering",
            "task automation",
            "workflow automation",
            "multi step reasoning",
        ],
    ),
    (
        "robotics",
        "Robots and embodied AI",
        0.8,
        &[
            "robotics",
            "robot",
            "robots",
            "autonomous robot",
            "robot learning",
            "embodied ai",
            "humanoid",
        ],
    ),
    (
        "ai_safety",
        "Safety, alignment, fairness and interpretability",
        0.9,
        &[
            "ai safety",
            "alignment",
            "bias detection",
            "fairness",
            "interpretability",
            "explainability",
            "responsible ai",
            "ai ethics",
            "red teaming",
        ],
    ),
    (
        "enterprise_ai",
        "AI products for businesses and the workplace",
        0.85,
        &[
            "enterprise ai",
            "business ai",
            "enterprise software",
            "saas",
            "b2b",
            "copilot",
            "workplace",
            "productivity",
            "workflow",
        ],
    ),
];

const CORE_TERMS: &[&str] = &[
    "ai",
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural",
    "neural network",
    "llm",
    "llms",
    "genai",
    "generative ai",
    "openai",
    "chatgpt",
];

const DEAL_TERMS: &[&str] = &[
    "raises",
    "raised",
    "raise",
    "raising",
    "secures",
    "secured",
    "funding",
    "funded",
    "investment",
    "invests",
    "invested",
    "series",
    "seed round",
    "venture capital",
    "acquisition",
    "acquires",
    "acquired",
    "merger",
    "ipo",
];

/// `(display name, aliases)`
const COMPANIES: &[(&str, &[&str])] = &[
    ("OpenAI", &[]),
    ("Anthropic", &[]),
    ("Google", &[]),
    ("Meta", &[]),
    ("Microsoft", &[]),
    ("Nvidia", &[]),
    ("Tesla", &[]),
    ("Groq", &[]),
    ("Together AI", &[]),
    ("Cohere", &[]),
    ("Stability AI", &[]),
    ("Hugging Face", &[]),
    ("Mistral AI", &["mistral"]),
    ("Aleph Alpha", &[]),
    ("Adept", &[]),
    ("Jasper", &[]),
    ("Perplexity", &[]),
    ("Scale AI", &[]),
    ("Databricks", &[]),
    ("Fireworks AI", &[]),
    ("Inflection AI", &[]),
    ("Character.AI", &["character ai"]),
    ("Runway", &[]),
    ("Midjourney", &[]),
    ("Glean", &[]),
    ("Sierra", &[]),
    ("Cognition", &[]),
    ("Anysphere", &[]),
    ("Replit", &[]),
    ("Codeium", &[]),
    ("Tabnine", &[]),
    ("Sourcegraph", &[]),
    ("Anyscale", &[]),
    ("LangChain", &[]),
    ("LlamaIndex", &[]),
    ("Pinecone", &[]),
    ("Weaviate", &[]),
    ("Qdrant", &[]),
    ("Google DeepMind", &["deepmind"]),
    ("xAI", &[]),
    ("AI21 Labs", &["ai21"]),
    ("Cerebras", &[]),
    ("SambaNova", &[]),
    ("Figure AI", &[]),
    ("Safe Superintelligence", &[]),
];

const INVESTORS: &[(&str, &[&str])] = &[
    ("Sequoia Capital", &["sequoia"]),
    ("Andreessen Horowitz", &["a16z"]),
    ("Benchmark Capital", &[]),
    ("Greylock", &["greylock partners"]),
    ("Khosla Ventures", &["khosla"]),
    ("Redpoint Ventures", &["redpoint"]),
    ("Menlo Ventures", &[]),
    ("Spark Capital", &[]),
    ("Bessemer Venture Partners", &["bessemer"]),
    ("Lightspeed Venture Partners", &["lightspeed"]),
    ("Insight Partners", &[]),
    ("Accel", &[]),
    ("Founders Fund", &[]),
    ("GV", &["google ventures"]),
    ("M12", &["microsoft ventures"]),
    ("Tiger Global", &[]),
    ("SoftBank", &["softbank vision fund"]),
    ("General Catalyst", &[]),
    ("Index Ventures", &[]),
    ("Thrive Capital", &[]),
    ("Coatue", &[]),
    ("Felicis", &["felicis ventures"]),
    ("Kleiner Perkins", &[]),
    ("NEA", &["new enterprise associates"]),
    ("IVP", &[]),
    ("DST Global", &[]),
    ("Y Combinator", &[]),
    ("Lux Capital", &[]),
    ("Greenoaks", &[]),
];

/// One taxonomy category with its keyword set and base weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base weight in `(0.0, 1.0]`.
    pub weight: f32,
    pub keywords: Vec<String>,
}

/// A known company or investor and the alternative spellings that refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Immutable keyword configuration shared by the classifier, scorer and deal
/// extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub categories: Vec<CategoryDef>,
    pub core_terms: Vec<String>,
    pub deal_terms: Vec<String>,
    #[serde(default = "default_inclusion_threshold")]
    pub inclusion_threshold: f32,
    #[serde(default)]
    pub companies: Vec<GazetteerEntry>,
    #[serde(default)]
    pub investors: Vec<GazetteerEntry>,
}

fn default_inclusion_threshold() -> f32 {
    DEFAULT_INCLUSION_THRESHOLD
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

fn entries(table: &[(&str, &[&str])]) -> Vec<GazetteerEntry> {
    table
        .iter()
        .map(|(name, aliases)| GazetteerEntry {
            name: (*name).to_string(),
            aliases: owned(aliases),
        })
        .collect()
}

impl Default for Taxonomy {
    /// The built-in tables.
    fn default() -> Self {
        Self {
            categories: CATEGORIES
                .iter()
                .map(|(name, description, weight, keywords)| CategoryDef {
                    name: (*name).to_string(),
                    description: (*description).to_string(),
                    weight: *weight,
                    keywords: owned(keywords),
                })
                .collect(),
            core_terms: owned(CORE_TERMS),
            deal_terms: owned(DEAL_TERMS),
            inclusion_threshold: DEFAULT_INCLUSION_THRESHOLD,
            companies: entries(COMPANIES),
            investors: entries(INVESTORS),
        }
    }
}

impl Taxonomy {
    /// Category names in taxonomy order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::Validation(
                "taxonomy must define at least one category".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "category name must be non-empty".to_string(),
                ));
            }
            if !seen.insert(category.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate category name: '{}'",
                    category.name
                )));
            }
            if !(category.weight > 0.0 && category.weight <= 1.0) {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has weight {}; must be in (0, 1]",
                    category.name, category.weight
                )));
            }
            if category.keywords.is_empty() || category.keywords.iter().any(|k| k.trim().is_empty())
            {
                return Err(ConfigError::Validation(format!(
                    "category '{}' needs a non-empty keyword list without blank entries",
                    category.name
                )));
            }
        }

        if !(0.0..1.0).contains(&self.inclusion_threshold) {
            return Err(ConfigError::Validation(format!(
                "inclusion_threshold {} must be in [0, 1)",
                self.inclusion_threshold
            )));
        }
        if self.core_terms.is_empty() {
            return Err(ConfigError::Validation(
                "core_terms must be non-empty".to_string(),
            ));
        }
        if self.deal_terms.is_empty() {
            return Err(ConfigError::Validation(
                "deal_terms must be non-empty".to_string(),
            ));
        }
        if let Some(entry) = self
            .companies
            .iter()
            .chain(&self.investors)
            .find(|e| e.name.trim().is_empty())
        {
            return Err(ConfigError::Validation(format!(
                "gazetteer entry with aliases {:?} has an empty name",
                entry.aliases
            )));
        }

        Ok(())
    }
}

/// Load and validate a taxonomy from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_taxonomy(path: &Path) -> Result<Taxonomy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TaxonomyFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_taxonomy(&content)
}

fn parse_taxonomy(content: &str) -> Result<Taxonomy, ConfigError> {
    let taxonomy: Taxonomy = serde_yaml::from_str(content)?;
    taxonomy.validate()?;
    Ok(taxonomy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_nine_categories_in_order() {
        let taxonomy = Taxonomy::default();
        let names: Vec<&str> = taxonomy.category_names().collect();
        assert_eq!(
            names,
            vec![
                "generative_ai",
                "machine_learning",
                "computer_vision",
                "nlp",
                "ai_infrastructure",
                "ai_agents",
                "robotics",
                "ai_safety",
                "enterprise_ai",
            ]
        );
    }

    #[test]
    fn builtin_is_valid() {
        Taxonomy::default().validate().unwrap();
    }

    #[test]
    fn builtin_gazetteer_knows_scenario_names() {
        let taxonomy = Taxonomy::default();
        assert!(taxonomy.companies.iter().any(|e| e.name == "OpenAI"));
        assert!(taxonomy.investors.iter().any(|e| e.name == "Thrive Capital"));
    }

    #[test]
    fn parses_minimal_yaml_with_defaults() {
        let yaml = r"
categories:
  - name: robotics
    weight: 0.8
    keywords: [robot, robotics]
core_terms: [ai]
deal_terms: [raises]
";
        let taxonomy = parse_taxonomy(yaml).unwrap();
        assert_eq!(taxonomy.categories.len(), 1);
        assert!((taxonomy.inclusion_threshold - DEFAULT_INCLUSION_THRESHOLD).abs() < f32::EPSILON);
        assert!(taxonomy.companies.is_empty());
        assert!(taxonomy.categories[0].description.is_empty());
    }

    #[test]
    fn rejects_duplicate_category_names() {
        let yaml = r"
categories:
  - { name: nlp, weight: 0.8, keywords: [nlp] }
  - { name: nlp, weight: 0.9, keywords: [speech recognition] }
core_terms: [ai]
deal_terms: [raises]
";
        let err = parse_taxonomy(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let yaml = r"
categories:
  - { name: nlp, weight: 1.5, keywords: [nlp] }
core_terms: [ai]
deal_terms: [raises]
";
        let err = parse_taxonomy(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("weight")));
    }

    #[test]
    fn rejects_empty_keyword_list() {
        let yaml = r"
categories:
  - { name: nlp, weight: 0.5, keywords: [] }
core_terms: [ai]
deal_terms: [raises]
";
        assert!(matches!(
            parse_taxonomy(yaml),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn rejects_threshold_of_one() {
        let mut taxonomy = Taxonomy::default();
        taxonomy.inclusion_threshold = 1.0;
        assert!(taxonomy.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = parse_taxonomy("categories: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_taxonomy(Path::new("/nonexistent/taxonomy.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::TaxonomyFileIo { .. }));
    }

    #[test]
    fn example_config_file_is_valid() {
        let content = include_str!("../../../config/taxonomy.example.yaml");
        let taxonomy = parse_taxonomy(content).unwrap();
        assert_eq!(taxonomy.categories.len(), 9);
    }
}
