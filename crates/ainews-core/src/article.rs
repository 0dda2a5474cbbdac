//! Article, deal and parse-result types shared by the parser and the store.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Accessibility of an article URL as last seen by the URL validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlStatus {
    #[default]
    Unchecked,
    Accessible,
    /// Paywall or login wall: the page answers but only with a teaser.
    PreviewOnly,
    Inaccessible,
}

impl UrlStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UrlStatus::Unchecked => "unchecked",
            UrlStatus::Accessible => "accessible",
            UrlStatus::PreviewOnly => "preview_only",
            UrlStatus::Inaccessible => "inaccessible",
        }
    }
}

impl std::fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UrlStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unchecked" => Ok(UrlStatus::Unchecked),
            "accessible" => Ok(UrlStatus::Accessible),
            "preview_only" => Ok(UrlStatus::PreviewOnly),
            "inaccessible" => Ok(UrlStatus::Inaccessible),
            other => Err(format!("unknown url status '{other}'")),
        }
    }
}

/// Funding round vocabulary recognised by the deal extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    Seed,
    #[serde(rename = "Series A")]
    SeriesA,
    #[serde(rename = "Series B")]
    SeriesB,
    #[serde(rename = "Series C")]
    SeriesC,
    #[serde(rename = "Series D")]
    SeriesD,
    #[serde(rename = "Series E")]
    SeriesE,
    #[serde(rename = "Series F")]
    SeriesF,
    Growth,
    #[serde(rename = "IPO")]
    Ipo,
    Acquisition,
    Debt,
}

impl RoundType {
    /// All round types, in the order the extractor tries them.
    pub const ALL: [RoundType; 11] = [
        RoundType::Seed,
        RoundType::SeriesA,
        RoundType::SeriesB,
        RoundType::SeriesC,
        RoundType::SeriesD,
        RoundType::SeriesE,
        RoundType::SeriesF,
        RoundType::Growth,
        RoundType::Ipo,
        RoundType::Acquisition,
        RoundType::Debt,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RoundType::Seed => "Seed",
            RoundType::SeriesA => "Series A",
            RoundType::SeriesB => "Series B",
            RoundType::SeriesC => "Series C",
            RoundType::SeriesD => "Series D",
            RoundType::SeriesE => "Series E",
            RoundType::SeriesF => "Series F",
            RoundType::Growth => "Growth",
            RoundType::Ipo => "IPO",
            RoundType::Acquisition => "Acquisition",
            RoundType::Debt => "Debt",
        }
    }
}

impl std::fmt::Display for RoundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RoundType::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown round type '{wanted}'"))
    }
}

/// One category assigned to an article, with its independent confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub name: String,
    /// In `(0.0, 1.0]`; not normalized across categories.
    pub weight: f32,
}

/// A funding or acquisition event extracted from article text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDeal {
    pub company_name: Option<String>,
    /// Whole amount in `currency` units; `None` when the round was named
    /// without a figure.
    pub amount: Option<f64>,
    /// ISO 4217 code.
    pub currency: String,
    /// The amount exactly as written, e.g. `"$6.6B"`.
    pub amount_text: Option<String>,
    pub round_type: Option<RoundType>,
    pub investors: Vec<String>,
    pub announcement_date: Option<NaiveDate>,
}

/// Everything the article parser derives from one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Always within `[0.0, 1.0]`.
    pub relevance_score: f32,
    pub categories: Vec<CategoryWeight>,
    pub is_deal_news: bool,
    pub deals: Vec<ExtractedDeal>,
    pub summary: String,
}

impl ParseResult {
    #[must_use]
    pub fn has_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }
}

/// Article fields supplied by the scraping collaborator.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Feed or site the article came from, e.g. `"techcrunch_rss"`.
    pub source: Option<String>,
    pub url_status: UrlStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_status_round_trips_through_str() {
        for status in [
            UrlStatus::Unchecked,
            UrlStatus::Accessible,
            UrlStatus::PreviewOnly,
            UrlStatus::Inaccessible,
        ] {
            assert_eq!(status.as_str().parse::<UrlStatus>().unwrap(), status);
        }
    }

    #[test]
    fn url_status_rejects_unknown() {
        assert!("broken".parse::<UrlStatus>().is_err());
    }

    #[test]
    fn url_status_serializes_snake_case() {
        let json = serde_json::to_string(&UrlStatus::PreviewOnly).unwrap();
        assert_eq!(json, "\"preview_only\"");
    }

    #[test]
    fn round_type_parses_labels_case_insensitively() {
        assert_eq!("series c".parse::<RoundType>().unwrap(), RoundType::SeriesC);
        assert_eq!("IPO".parse::<RoundType>().unwrap(), RoundType::Ipo);
        assert_eq!(" Seed ".parse::<RoundType>().unwrap(), RoundType::Seed);
        assert!("Series Z".parse::<RoundType>().is_err());
    }

    #[test]
    fn round_type_serializes_as_label() {
        let json = serde_json::to_string(&RoundType::SeriesB).unwrap();
        assert_eq!(json, "\"Series B\"");
    }

    #[test]
    fn has_category_matches_by_name() {
        let result = ParseResult {
            relevance_score: 0.5,
            categories: vec![CategoryWeight {
                name: "robotics".to_string(),
                weight: 0.16,
            }],
            is_deal_news: false,
            deals: vec![],
            summary: String::new(),
        };
        assert!(result.has_category("robotics"));
        assert!(!result.has_category("nlp"));
    }
}
