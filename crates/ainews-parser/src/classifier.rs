//! Keyword classifier over the nine-category taxonomy.

use ainews_core::{CategoryWeight, Taxonomy};

use crate::text::{compile_phrases, contains_phrase, tokenize, Phrase};

#[derive(Debug, Clone)]
struct CompiledCategory {
    name: String,
    weight: f32,
    keywords: Vec<Phrase>,
}

/// Scores text against every taxonomy category independently.
///
/// Per category: `distinct matched keywords / keyword count × base weight`,
/// clipped to `[0, 1]`. Only scores strictly above the taxonomy's inclusion
/// threshold are reported. Weights are not normalized across categories.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    categories: Vec<CompiledCategory>,
    threshold: f32,
}

impl CategoryClassifier {
    #[must_use]
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let categories = taxonomy
            .categories
            .iter()
            .map(|c| CompiledCategory {
                name: c.name.clone(),
                weight: c.weight,
                keywords: compile_phrases(&c.keywords),
            })
            .collect();
        Self {
            categories,
            threshold: taxonomy.inclusion_threshold,
        }
    }

    /// Categories for an article, in taxonomy order. Empty is a valid result.
    #[must_use]
    pub fn classify(&self, title: &str, content: &str) -> Vec<CategoryWeight> {
        self.classify_tokens(&tokenize(title), &tokenize(content))
    }

    pub(crate) fn classify_tokens(&self, title: &[String], content: &[String]) -> Vec<CategoryWeight> {
        let mut result = Vec::new();

        for category in &self.categories {
            if category.keywords.is_empty() {
                continue;
            }
            let matched = category
                .keywords
                .iter()
                .filter(|k| contains_phrase(title, k) || contains_phrase(content, k))
                .count();
            if matched == 0 {
                continue;
            }

            #[allow(clippy::cast_precision_loss)]
            let fraction = matched as f32 / category.keywords.len() as f32;
            let score = (fraction * category.weight).clamp(0.0, 1.0);
            if score > self.threshold {
                result.push(CategoryWeight {
                    name: category.name.clone(),
                    weight: score,
                });
            }
        }

        result
    }
}
