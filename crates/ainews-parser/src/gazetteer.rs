//! Known-entity lookup used to confirm and canonicalize company and investor
//! names.

use std::ops::Range;

use ainews_core::{GazetteerEntry, Taxonomy};

use crate::text::{tokenize, tokenize_with_spans, Phrase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Company,
    Investor,
}

/// A known entity found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Canonical display name from the gazetteer.
    pub name: String,
    /// Byte range of the matched spelling in the scanned text.
    pub span: Range<usize>,
}

/// Lookup capability for known companies and investors.
///
/// The deal extractor only talks to this trait, so its heuristics can be
/// exercised against any list.
pub trait Gazetteer: Send + Sync {
    /// Canonical name if `name` (or one of its aliases) is known.
    fn lookup(&self, kind: EntityKind, name: &str) -> Option<String>;

    /// Every known entity of `kind` mentioned in `text`, in order of
    /// appearance. Overlapping spellings resolve to the longest one.
    fn mentions(&self, kind: EntityKind, text: &str) -> Vec<Mention>;
}

#[derive(Debug, Clone)]
struct CompiledEntry {
    name: String,
    spellings: Vec<Phrase>,
}

fn compile(entries: &[GazetteerEntry]) -> Vec<CompiledEntry> {
    entries
        .iter()
        .map(|e| {
            let mut spellings = vec![tokenize(&e.name)];
            spellings.extend(e.aliases.iter().map(|a| tokenize(a)));
            spellings.retain(|s| !s.is_empty());
            CompiledEntry {
                name: e.name.clone(),
                spellings,
            }
        })
        .collect()
}

/// In-memory gazetteer over fixed company and investor lists.
#[derive(Debug, Clone)]
pub struct StaticGazetteer {
    companies: Vec<CompiledEntry>,
    investors: Vec<CompiledEntry>,
}

impl StaticGazetteer {
    #[must_use]
    pub fn new(companies: &[GazetteerEntry], investors: &[GazetteerEntry]) -> Self {
        Self {
            companies: compile(companies),
            investors: compile(investors),
        }
    }

    #[must_use]
    pub fn from_taxonomy(taxonomy: &Taxonomy) -> Self {
        Self::new(&taxonomy.companies, &taxonomy.investors)
    }

    fn entries(&self, kind: EntityKind) -> &[CompiledEntry] {
        match kind {
            EntityKind::Company => &self.companies,
            EntityKind::Investor => &self.investors,
        }
    }
}

impl Gazetteer for StaticGazetteer {
    fn lookup(&self, kind: EntityKind, name: &str) -> Option<String> {
        let wanted = tokenize(name);
        if wanted.is_empty() {
            return None;
        }
        self.entries(kind)
            .iter()
            .find(|e| e.spellings.iter().any(|s| *s == wanted))
            .map(|e| e.name.clone())
    }

    fn mentions(&self, kind: EntityKind, text: &str) -> Vec<Mention> {
        let tokens = tokenize_with_spans(text);
        let words: Vec<&str> = tokens.iter().map(|(t, _)| t.as_str()).collect();
        let entries = self.entries(kind);

        let mut found = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let mut best: Option<(usize, &CompiledEntry)> = None;
            for entry in entries {
                for spelling in &entry.spellings {
                    let len = spelling.len();
                    if i + len <= words.len()
                        && spelling.iter().zip(&words[i..i + len]).all(|(a, b)| a.as_str() == *b)
                        && best.map_or(true, |(l, _)| len > l)
                    {
                        best = Some((len, entry));
                    }
                }
            }

            if let Some((len, entry)) = best {
                found.push(Mention {
                    name: entry.name.clone(),
                    span: tokens[i].1.start..tokens[i + len - 1].1.end,
                });
                i += len;
            } else {
                i += 1;
            }
        }

        found
    }
}
