//! Money amounts in free text: `$6.6B`, `€1.2M`, `EUR 5 million`,
//! `250 million dollars`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;

const NUMERAL: &str = r"[0-9]{1,3}(?:,[0-9]{3})+(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?";
const MAGNITUDE: &str = r"thousand|million|billion|mn|bn|k|m|b";
const ISO_CODE: &str = r"usd|eur|gbp|jpy|cny|inr|cad|aud|chf";
const CURRENCY_WORD: &str = r"dollars|euros|pounds|yen";

/// Largest amount accepted, in currency units. Anything bigger is a
/// misparse, not a funding figure.
pub const MAX_AMOUNT: f64 = 1e13;

/// Three shapes: symbol before the number, ISO code before the number, or a
/// marker after the number. A trailing ISO code needs a magnitude
/// (`40M USD`) so that `2024 USD` is not read as money; a trailing currency
/// word (`5 dollars`) does not.
static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?i)(?P<sym>[$€£¥])\s?(?P<n1>{NUMERAL})(?:\s?(?P<m1>{MAGNITUDE})\b)?|\b(?P<c2>{ISO_CODE})\s?(?P<n2>{NUMERAL})(?:\s?(?P<m2>{MAGNITUDE})\b)?|\b(?P<n3>{NUMERAL})\s?(?:(?P<m3>{MAGNITUDE})\s?(?P<c3>{ISO_CODE}|{CURRENCY_WORD})|(?P<w3>{CURRENCY_WORD}))\b"
    );
    Regex::new(&pattern).expect("valid amount regex")
});

/// One money amount found in text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedAmount {
    /// Magnitude-expanded value in `currency` units. No FX conversion.
    pub amount: f64,
    /// ISO 4217 code.
    pub currency: String,
    /// Byte range of the match in the input.
    pub span: Range<usize>,
    /// The matched text, e.g. `"$6.6B"`.
    pub raw: String,
}

/// Find every money amount in `text`, in order of appearance.
///
/// A number only counts when a currency marker accompanies it, so
/// `3 million users` yields nothing. Fragments that fail to parse, and
/// values above [`MAX_AMOUNT`], are skipped; this never panics.
#[must_use]
pub fn parse_amounts(text: &str) -> Vec<ParsedAmount> {
    AMOUNT_RE
        .captures_iter(text)
        .filter_map(|caps| amount_from_captures(&caps))
        .collect()
}

fn amount_from_captures(caps: &Captures<'_>) -> Option<ParsedAmount> {
    let whole = caps.get(0)?;

    let (numeral, magnitude, currency) = if let Some(sym) = caps.name("sym") {
        (
            caps.name("n1")?.as_str(),
            caps.name("m1"),
            symbol_currency(sym.as_str())?,
        )
    } else if let Some(code) = caps.name("c2") {
        (
            caps.name("n2")?.as_str(),
            caps.name("m2"),
            code.as_str().to_ascii_uppercase(),
        )
    } else {
        (
            caps.name("n3")?.as_str(),
            caps.name("m3"),
            trailing_currency(caps.name("c3").or_else(|| caps.name("w3"))?.as_str())?,
        )
    };

    let value: f64 = numeral.replace(',', "").parse().ok()?;
    let amount = value * magnitude.map_or(1.0, |m| multiplier(m.as_str()));
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_AMOUNT {
        return None;
    }

    Some(ParsedAmount {
        amount,
        currency,
        span: whole.range(),
        raw: whole.as_str().trim().to_string(),
    })
}

fn multiplier(magnitude: &str) -> f64 {
    match magnitude.to_ascii_lowercase().as_str() {
        "k" | "thousand" => 1e3,
        "m" | "mn" | "million" => 1e6,
        "b" | "bn" | "billion" => 1e9,
        _ => 1.0,
    }
}

fn symbol_currency(symbol: &str) -> Option<String> {
    let code = match symbol {
        "$" => "USD",
        "€" => "EUR",
        "£" => "GBP",
        "¥" => "JPY",
        _ => return None,
    };
    Some(code.to_string())
}

fn trailing_currency(marker: &str) -> Option<String> {
    let lower = marker.to_ascii_lowercase();
    let code = match lower.as_str() {
        "dollars" => "USD",
        "euros" => "EUR",
        "pounds" => "GBP",
        "yen" => "JPY",
        _ => return Some(lower.to_ascii_uppercase()),
    };
    Some(code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn single(text: &str) -> ParsedAmount {
        let found = parse_amounts(text);
        assert_eq!(found.len(), 1, "expected one amount in {text:?}, got {found:?}");
        found.into_iter().next().unwrap()
    }

    #[test]
    fn dollar_billions_with_suffix() {
        let a = single("$6.6B");
        assert!(approx(a.amount, 6_600_000_000.0), "got {}", a.amount);
        assert_eq!(a.currency, "USD");
        assert_eq!(a.raw, "$6.6B");
    }

    #[test]
    fn euro_millions_keep_their_currency() {
        let a = single("€1.2M");
        assert!(approx(a.amount, 1_200_000.0), "got {}", a.amount);
        assert_eq!(a.currency, "EUR");
    }

    #[test]
    fn spelled_out_magnitude() {
        let a = single("The startup raised $50 million last week");
        assert!(approx(a.amount, 50_000_000.0));
        assert_eq!(a.currency, "USD");
        assert_eq!(a.raw, "$50 million");
    }

    #[test]
    fn bare_numbers_are_not_amounts() {
        assert!(parse_amounts("The app reached 3 million users in 2024").is_empty());
    }

    #[test]
    fn iso_code_before_number() {
        let a = single("a round of EUR 5 million");
        assert!(approx(a.amount, 5_000_000.0));
        assert_eq!(a.currency, "EUR");
    }

    #[test]
    fn currency_after_number() {
        let a = single("worth 250 million dollars");
        assert!(approx(a.amount, 250_000_000.0));
        assert_eq!(a.currency, "USD");

        let b = single("a 40mn GBP facility");
        assert!(approx(b.amount, 40_000_000.0));
        assert_eq!(b.currency, "GBP");
    }

    #[test]
    fn comma_grouped_numerals() {
        let a = single("$1,200,000.50 in grants");
        assert!(approx(a.amount, 1_200_000.5));
    }

    #[test]
    fn other_symbols_and_short_suffixes() {
        let yen = single("¥500M");
        assert_eq!(yen.currency, "JPY");
        assert!(approx(yen.amount, 500_000_000.0));

        let pounds = single("£2bn");
        assert_eq!(pounds.currency, "GBP");
        assert!(approx(pounds.amount, 2_000_000_000.0));

        let k = single("$750K");
        assert!(approx(k.amount, 750_000.0));
    }

    #[test]
    fn suffix_must_end_a_word() {
        let a = single("$5 more than planned");
        assert!(approx(a.amount, 5.0));
        assert_eq!(a.raw, "$5");
    }

    #[test]
    fn multiple_amounts_in_order_with_spans() {
        let text = "raised $40M at a $400M valuation";
        let found = parse_amounts(text);
        assert_eq!(found.len(), 2);
        assert!(approx(found[0].amount, 40_000_000.0));
        assert!(approx(found[1].amount, 400_000_000.0));
        assert_eq!(&text[found[1].span.clone()], "$400M");
    }

    #[test]
    fn oversized_numerals_are_dropped() {
        assert!(parse_amounts("Acme raises $99999999999B in a Series A round.").is_empty());
        assert!(parse_amounts("USD 123456789012345678901234567890").is_empty());

        let largest = single("a $10,000B war chest");
        assert!(approx(largest.amount, MAX_AMOUNT));
    }

    #[test]
    fn year_before_iso_code_is_not_money() {
        assert!(parse_amounts("figures are in 2024 USD terms").is_empty());
        assert!(parse_amounts("prices in 2023 EUR").is_empty());

        let a = single("in 2024 USD terms it raised 40M USD");
        assert!(approx(a.amount, 40_000_000.0));
        assert_eq!(a.raw, "40M USD");
    }

    #[test]
    fn currency_word_needs_no_magnitude() {
        let a = single("a grant of 5000 dollars");
        assert!(approx(a.amount, 5_000.0));
        assert_eq!(a.currency, "USD");

        let b = single("a 5 million USD seed");
        assert!(approx(b.amount, 5_000_000.0));
        assert_eq!(b.currency, "USD");
    }

    #[test]
    fn zero_and_lonely_symbols_are_skipped() {
        assert!(parse_amounts("$0 and $ and € nothing").is_empty());
        assert!(parse_amounts("").is_empty());
    }
}
