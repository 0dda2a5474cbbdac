//! Word tokenization shared by every keyword matcher.
//!
//! A token is a maximal run of alphanumeric characters, lowercased. Keyword
//! phrases are tokenized the same way, so matching is always on whole-word
//! boundaries: `ml` matches "ML-based" but not "html".

use std::ops::Range;

/// A tokenized keyword phrase, e.g. `["large", "language", "model"]`.
pub(crate) type Phrase = Vec<String>;

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_spans(text).into_iter().map(|(t, _)| t).collect()
}

/// Tokens paired with their byte range in `text`.
pub(crate) fn tokenize_with_spans(text: &str) -> Vec<(String, Range<usize>)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(idx);
            }
        } else if let Some(s) = start.take() {
            tokens.push((text[s..idx].to_lowercase(), s..idx));
        }
    }
    if let Some(s) = start {
        tokens.push((text[s..].to_lowercase(), s..text.len()));
    }

    tokens
}

/// Tokenize and deduplicate keyword phrases, dropping blank ones.
pub(crate) fn compile_phrases<S: AsRef<str>>(phrases: &[S]) -> Vec<Phrase> {
    let mut compiled: Vec<Phrase> = Vec::with_capacity(phrases.len());
    for phrase in phrases {
        let tokens = tokenize(phrase.as_ref());
        if !tokens.is_empty() && !compiled.contains(&tokens) {
            compiled.push(tokens);
        }
    }
    compiled
}

pub(crate) fn count_phrase(tokens: &[String], phrase: &[String]) -> usize {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return 0;
    }
    tokens.windows(phrase.len()).filter(|w| *w == phrase).count()
}

pub(crate) fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    if phrase.is_empty() || phrase.len() > tokens.len() {
        return false;
    }
    tokens.windows(phrase.len()).any(|w| w == phrase)
}

pub(crate) fn contains_any(tokens: &[String], phrases: &[Phrase]) -> bool {
    phrases.iter().any(|p| contains_phrase(tokens, p))
}

/// Collapse every run of whitespace to a single space and trim the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap `text` at `max_chars` characters, cutting on a word boundary and
/// appending `…` when anything was removed. The ellipsis counts toward the cap.
pub(crate) fn truncate_on_word(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let keep = max_chars - 1;
    let cut = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(idx, _)| idx);
    let head = &text[..cut];

    // Only back up to a space if the cut landed inside a word.
    let at_boundary = text[cut..].starts_with(char::is_whitespace);
    let head = if at_boundary {
        head
    } else {
        match head.rfind(char::is_whitespace) {
            Some(space) if space > 0 => &head[..space],
            _ => head,
        }
    };

    format!("{}…", head.trim_end())
}
