//! Funding-deal extraction: deal vocabulary, amounts, round type, company,
//! investors and announcement date.

use std::sync::{Arc, LazyLock};

use ainews_core::{ExtractedDeal, RoundType, Taxonomy};
use chrono::NaiveDate;
use regex::Regex;

use crate::amount::{parse_amounts, ParsedAmount};
use crate::gazetteer::{EntityKind, Gazetteer};
use crate::text::{compile_phrases, contains_any, contains_phrase, tokenize, Phrase};

const CAP_WORD: &str = r"[A-Z][\w&'.-]*";

/// `<Name> [has|just|...] raises|secures|closes|lands|announces`
static SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<name>{CAP_WORD}(?:[ \t]+{CAP_WORD}){{0,3}})(?:[ \t]+(?i:has|have|had|just|today|reportedly|officially|quietly|now)){{0,2}}[ \t]+(?i:raises|raised|secures|secured|closes|closed|lands|landed|announces|announced|nabs|bags)\b"
    ))
    .expect("valid subject regex")
});

/// `startup <Name>` / `company <Name>`
static DESCRIBED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?i:startup|start-up|company|firm|unicorn)[ \t]+(?P<name>{CAP_WORD}(?:[ \t]+{CAP_WORD}){{0,3}})"
    ))
    .expect("valid described-company regex")
});

static INVESTOR_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:co-led by|led by|backed by|participation from|investors including|investors include|investors such as|from investors|investment from|funding from)\b",
    )
    .expect("valid investor context regex")
});

static LEADING_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9][\w&'.-]*(?:[ \t]+[A-Z0-9][\w&'.-]*){0,4}")
        .expect("valid leading name regex")
});

static LIST_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*,\s*(?:and\s+)?|\s+and\s+|\s+as well as\s+").expect("valid list separator regex")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?P<month>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+(?P<day>[0-9]{1,2}),?\s+(?P<year>[0-9]{4})\b|\b(?P<iy>[0-9]{4})-(?P<im>[0-9]{2})-(?P<id>[0-9]{2})\b",
    )
    .expect("valid date regex")
});

const DEAL_VERBS: &[&str] = &[
    "raises", "raised", "secures", "secured", "closes", "closed", "lands", "landed", "announces",
    "announced", "nabs", "bags",
];

/// Words that describe the entity rather than name it: `AI startup Acme`.
const DESCRIPTOR_WORDS: &[&str] = &["startup", "start-up", "company", "firm", "unicorn", "maker"];

const LEADING_NOISE: &[&str] = &[
    "the", "a", "an", "on", "in", "today", "yesterday", "this", "last", "ai", "exclusive",
    "breaking", "stealth", "report", "update", "monday", "tuesday", "wednesday", "thursday",
    "friday", "saturday", "sunday", "u.s", "us", "uk", "european", "french", "german", "british",
    "chinese", "indian", "israeli", "american", "generative",
];

const BLOCKLIST: &[&str] = &[
    "it", "this", "that", "he", "she", "they", "we", "company", "startup", "firm", "funding",
    "investors", "investor", "ceo", "founder", "founders", "round", "reuters", "bloomberg",
];

const ROUND_VOCABULARY: &[(RoundType, &[&str])] = &[
    (RoundType::Seed, &["seed", "pre-seed"]),
    (RoundType::SeriesA, &["series a"]),
    (RoundType::SeriesB, &["series b"]),
    (RoundType::SeriesC, &["series c"]),
    (RoundType::SeriesD, &["series d"]),
    (RoundType::SeriesE, &["series e"]),
    (RoundType::SeriesF, &["series f"]),
    (
        RoundType::Growth,
        &["growth round", "growth equity", "growth stage", "growth funding"],
    ),
    (RoundType::Ipo, &["ipo", "initial public offering"]),
    (RoundType::Acquisition, &["acquisition", "acquires", "acquired"]),
    (
        RoundType::Debt,
        &["debt financing", "debt round", "venture debt", "credit facility"],
    ),
];

const COMPANY_MAX_LEN: usize = 60;

// Candidate points: pattern hits dominate plain gazetteer mentions.
const PATTERN_POINTS: u32 = 4;
const MENTION_POINTS: u32 = 1;
const TITLE_BONUS: u32 = 2;
const KNOWN_BONUS: u32 = 4;

/// Everything the extractor learned about one article.
#[derive(Debug, Clone, PartialEq)]
pub struct DealAnalysis {
    /// Deal vocabulary appears in the title or body.
    pub deal_signal: bool,
    /// The amount parser found at least one amount, valuation or not.
    pub amount_found: bool,
    pub round_type: Option<RoundType>,
    pub deals: Vec<ExtractedDeal>,
}

impl DealAnalysis {
    #[must_use]
    pub fn is_deal_news(&self) -> bool {
        self.deal_signal && (self.amount_found || self.round_type.is_some())
    }
}

/// Stateless deal extractor over title + content.
///
/// Emits one [`ExtractedDeal`] per distinct non-valuation amount, all sharing
/// the same round, company, investors and date. With a deal signal and a
/// round type but no amount it emits a single amountless deal, provided a
/// company was identified.
pub struct DealExtractor {
    deal_terms: Vec<Phrase>,
    rounds: Vec<(RoundType, Vec<Phrase>)>,
    gazetteer: Arc<dyn Gazetteer>,
}

impl std::fmt::Debug for DealExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DealExtractor")
            .field("deal_terms", &self.deal_terms.len())
            .finish_non_exhaustive()
    }
}

impl DealExtractor {
    #[must_use]
    pub fn new(taxonomy: &Taxonomy, gazetteer: Arc<dyn Gazetteer>) -> Self {
        let rounds = ROUND_VOCABULARY
            .iter()
            .map(|(round, phrases)| (*round, compile_phrases(phrases)))
            .collect();
        Self {
            deal_terms: compile_phrases(&taxonomy.deal_terms),
            rounds,
            gazetteer,
        }
    }

    #[must_use]
    pub fn extract(&self, title: &str, content: &str) -> DealAnalysis {
        self.analyze(title, content, &tokenize(title), &tokenize(content))
    }

    pub(crate) fn analyze(
        &self,
        title: &str,
        content: &str,
        title_tokens: &[String],
        content_tokens: &[String],
    ) -> DealAnalysis {
        let text = format!("{title}\n{content}");
        let amounts = parse_amounts(&text);
        let deal_signal = contains_any(title_tokens, &self.deal_terms)
            || contains_any(content_tokens, &self.deal_terms);
        let round_type = self.round_type(title_tokens, content_tokens);

        let mut analysis = DealAnalysis {
            deal_signal,
            amount_found: !amounts.is_empty(),
            round_type,
            deals: Vec::new(),
        };
        if !deal_signal {
            return analysis;
        }

        let funding = funding_amounts(&text, amounts);
        let company = self.company(&text, title.len());
        if funding.is_empty() && (round_type.is_none() || company.is_none()) {
            return analysis;
        }

        let investors = self.investors(&text, company.as_deref());
        let announcement_date = announcement_date(&text);
        let deal = |amount: Option<&ParsedAmount>| ExtractedDeal {
            company_name: company.clone(),
            amount: amount.map(|a| a.amount),
            currency: amount.map_or_else(|| "USD".to_string(), |a| a.currency.clone()),
            amount_text: amount.map(|a| a.raw.clone()),
            round_type,
            investors: investors.clone(),
            announcement_date,
        };

        analysis.deals = if funding.is_empty() {
            vec![deal(None)]
        } else {
            funding.iter().map(|a| deal(Some(a))).collect()
        };
        analysis
    }

    /// Title first, then body; within a text the vocabulary order decides.
    fn round_type(&self, title: &[String], content: &[String]) -> Option<RoundType> {
        [title, content].into_iter().find_map(|tokens| {
            self.rounds
                .iter()
                .find(|(_, phrases)| phrases.iter().any(|p| contains_phrase(tokens, p)))
                .map(|(round, _)| *round)
        })
    }

    fn company(&self, text: &str, title_end: usize) -> Option<String> {
        let mut candidates: Vec<Candidate> = Vec::new();
        let title_bonus = |pos: usize| if pos < title_end { TITLE_BONUS } else { 0 };

        for re in [&*SUBJECT_RE, &*DESCRIBED_RE] {
            for caps in re.captures_iter(text) {
                let Some(m) = caps.name("name") else { continue };
                let Some(name) = clean_candidate(m.as_str()) else {
                    continue;
                };
                let name = self
                    .gazetteer
                    .lookup(EntityKind::Company, &name)
                    .unwrap_or(name);
                add_candidate(
                    &mut candidates,
                    name,
                    m.start(),
                    PATTERN_POINTS + title_bonus(m.start()),
                    true,
                );
            }
        }

        for mention in self.gazetteer.mentions(EntityKind::Company, text) {
            let pos = mention.span.start;
            add_candidate(
                &mut candidates,
                mention.name,
                pos,
                MENTION_POINTS + title_bonus(pos),
                false,
            );
        }

        for candidate in &mut candidates {
            if candidate.from_pattern
                && self
                    .gazetteer
                    .lookup(EntityKind::Company, &candidate.name)
                    .is_some()
            {
                candidate.score += KNOWN_BONUS;
            }
        }

        candidates
            .into_iter()
            .reduce(|best, c| {
                if c.score > best.score || (c.score == best.score && c.first_seen < best.first_seen)
                {
                    c
                } else {
                    best
                }
            })
            .map(|c| c.name)
    }

    /// Investors in order of first appearance, deduplicated, company excluded.
    fn investors(&self, text: &str, company: Option<&str>) -> Vec<String> {
        let mut found: Vec<(usize, String)> = self
            .gazetteer
            .mentions(EntityKind::Investor, text)
            .into_iter()
            .map(|m| (m.span.start, m.name))
            .collect();

        for trigger in INVESTOR_CONTEXT_RE.find_iter(text) {
            let list_start = trigger.end();
            let list = sentence_prefix(&text[list_start..]);
            for (offset, piece) in list_items(list) {
                let trimmed = strip_list_prefixes(piece.trim_start());
                let lead = piece.len() - trimmed.len();
                let Some(m) = LEADING_NAME_RE.find(trimmed) else {
                    break;
                };
                let Some(name) = clean_candidate(m.as_str()) else {
                    continue;
                };
                let name = self
                    .gazetteer
                    .lookup(EntityKind::Investor, &name)
                    .or_else(|| self.gazetteer.lookup(EntityKind::Company, &name))
                    .unwrap_or(name);
                found.push((list_start + offset + lead, name));
            }
        }

        found.sort_by_key(|(pos, _)| *pos);

        let mut investors: Vec<String> = Vec::new();
        for (_, name) in found {
            let is_company = company.is_some_and(|c| c.eq_ignore_ascii_case(&name));
            if !is_company && !investors.iter().any(|i| i.eq_ignore_ascii_case(&name)) {
                investors.push(name);
            }
        }
        investors
    }
}

#[derive(Debug)]
struct Candidate {
    name: String,
    first_seen: usize,
    score: u32,
    from_pattern: bool,
}

fn add_candidate(
    candidates: &mut Vec<Candidate>,
    name: String,
    pos: usize,
    points: u32,
    from_pattern: bool,
) {
    if let Some(existing) = candidates
        .iter_mut()
        .find(|c| c.name.eq_ignore_ascii_case(&name))
    {
        existing.score += points;
        existing.first_seen = existing.first_seen.min(pos);
        existing.from_pattern |= from_pattern;
    } else {
        candidates.push(Candidate {
            name,
            first_seen: pos,
            score: points,
            from_pattern,
        });
    }
}

/// Drop valuation figures and collapse repeated (amount, currency) pairs.
fn funding_amounts(text: &str, amounts: Vec<ParsedAmount>) -> Vec<ParsedAmount> {
    let mut funding: Vec<ParsedAmount> = Vec::new();
    for amount in amounts {
        if is_valuation(text, &amount) {
            continue;
        }
        let repeated = funding
            .iter()
            .any(|f| f.currency == amount.currency && (f.amount - amount.amount).abs() < 0.5);
        if !repeated {
            funding.push(amount);
        }
    }
    funding
}

fn is_valuation(text: &str, amount: &ParsedAmount) -> bool {
    let before = text[..amount.span.start].to_lowercase();
    let before = before.trim_end();
    if before.ends_with("valued at")
        || before.ends_with("valuation of")
        || before.ends_with("valuing it at")
        || before.ends_with("valuation to")
    {
        return true;
    }

    // "$157B valuation", "$1B post-money valuation"
    for word in text[amount.span.end..].split_whitespace().take(3) {
        if word.chars().any(|c| c.is_ascii_digit() || "$€£¥".contains(c)) {
            break;
        }
        if word.to_lowercase().contains("valuation") {
            return true;
        }
    }
    false
}

fn clean_candidate(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw
        .split_whitespace()
        .map(|w| {
            let w = w
                .strip_suffix("'s")
                .or_else(|| w.strip_suffix("’s"))
                .unwrap_or(w);
            w.trim_end_matches(|c: char| matches!(c, '.' | ',' | '\'' | '-' | '&'))
        })
        .filter(|w| !w.is_empty())
        .collect();

    let end = words
        .iter()
        .position(|w| is_one_of(w, DEAL_VERBS))
        .unwrap_or(words.len());
    let words = &words[..end];
    let start = words
        .iter()
        .rposition(|w| is_one_of(w, DESCRIPTOR_WORDS))
        .map_or(0, |i| i + 1);
    let mut words = &words[start..];
    while let Some((first, rest)) = words.split_first() {
        let lower = first.to_lowercase();
        if is_one_of(first, LEADING_NOISE) || lower.ends_with("-backed") || lower.ends_with("-based")
        {
            words = rest;
        } else {
            break;
        }
    }

    let name = words.join(" ");
    let valid = name.chars().count() >= 2
        && name.len() <= COMPANY_MAX_LEN
        && name.starts_with(|c: char| c.is_uppercase() || c.is_ascii_digit())
        && !is_one_of(&name, BLOCKLIST)
        && name.parse::<RoundType>().is_err();
    valid.then_some(name)
}

fn is_one_of(word: &str, list: &[&str]) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

/// Text up to the end of the current sentence or clause.
fn sentence_prefix(text: &str) -> &str {
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let ends = match ch {
            ';' | '\n' | '(' => true,
            '.' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if ends {
            return &text[..idx];
        }
    }
    text
}

/// Comma/`and`-separated items with their byte offsets in `list`.
fn list_items(list: &str) -> Vec<(usize, &str)> {
    let mut items = Vec::new();
    let mut last = 0;
    for sep in LIST_SEPARATOR_RE.find_iter(list) {
        items.push((last, &list[last..sep.start()]));
        last = sep.end();
    }
    items.push((last, &list[last..]));
    items
}

fn strip_list_prefixes(mut piece: &str) -> &str {
    const PREFIXES: &[&str] = &[
        "existing investors ",
        "existing investor ",
        "new investors ",
        "investors ",
        "including ",
        "firms ",
        "both ",
        "the ",
    ];
    'outer: loop {
        for prefix in PREFIXES {
            if piece.len() >= prefix.len()
                && piece.is_char_boundary(prefix.len())
                && piece[..prefix.len()].eq_ignore_ascii_case(prefix)
            {
                piece = &piece[prefix.len()..];
                continue 'outer;
            }
        }
        return piece;
    }
}

fn announcement_date(text: &str) -> Option<NaiveDate> {
    DATE_RE.captures_iter(text).find_map(|caps| {
        if let Some(month) = caps.name("month") {
            let month = month_number(month.as_str())?;
            let day = caps.name("day")?.as_str().parse().ok()?;
            let year = caps.name("year")?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        } else {
            let year = caps.name("iy")?.as_str().parse().ok()?;
            let month = caps.name("im")?.as_str().parse().ok()?;
            let day = caps.name("id")?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
    })
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
#[path = "deals_test.rs"]
mod tests;
