//! Field Heuristics
//!
//! Regex-based extraction of a dollar amount, a holder name and a date of
//! birth from normalized document text. Amount extraction runs a list of
//! independent strategies, each producing in-range candidates, and reports
//! the largest candidate any of them found.

use regex::Regex;
use std::sync::OnceLock;

use homebase_utils::ExtractionConfig;

/// Phrases that usually sit next to the figure a lender or bank is vouching for.
pub const AMOUNT_TRIGGERS: &[&str] = &[
    "approved",
    "pre-approved",
    "pre-approval",
    "loan amount",
    "purchase price",
    "verified",
    "available balance",
    "total balance",
    "ending balance",
    "up to",
    "amount of",
];

/// Labels that end a name on identity documents.
const NAME_STOP_WORDS: &[&str] = &[
    "dob", "date", "birth", "sex", "address", "addr", "exp", "iss", "issued", "class", "dl", "id",
    "hgt", "wgt", "eyes", "hair",
];

fn currency_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:\$|\busd\b)\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?")
            .expect("currency pattern is valid")
    })
}

fn loose_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(\d{1,3}(?:,\d{3})+|\d{4,9})(?:\.\d{1,2})?\b").expect("loose pattern is valid")
    })
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

fn labeled_dob_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:\bd\.o\.b\.?|\b(?:dob|date of birth|birth ?date|birth)\b)\s*[:#\-]?\s*(\d{4}-\d{2}-\d{2}|\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4})",
        )
        .expect("dob pattern is valid")
    })
}

fn iso_date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("iso date pattern is valid"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?i:full name|name)\b\s*[:\-]?\s*([A-Z][A-Za-z'\-]+(?: [A-Z][A-Za-z'.\-]*){0,3})")
            .expect("name pattern is valid")
    })
}

/// Collapses whitespace runs to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text, " ").trim().to_string()
}

/// Inclusive range a candidate amount must fall in.
#[derive(Debug, Clone, Copy)]
pub struct AmountBounds {
    pub min: u64,
    pub max: u64,
}

impl AmountBounds {
    fn accept(&self, digits: &str) -> Option<u64> {
        let value: u64 = digits.replace(',', "").parse().ok()?;
        (self.min..=self.max).contains(&value).then_some(value)
    }
}

impl From<&ExtractionConfig> for AmountBounds {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            min: config.min_amount,
            max: config.max_amount,
        }
    }
}

pub trait AmountStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn candidates(&self, text: &str, bounds: &AmountBounds) -> Vec<u64>;
}

/// Numbers preceded by `$` or `USD`.
pub struct CurrencyMarked;

impl AmountStrategy for CurrencyMarked {
    fn name(&self) -> &'static str {
        "currency"
    }

    fn candidates(&self, text: &str, bounds: &AmountBounds) -> Vec<u64> {
        currency_regex()
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .filter_map(|m| bounds.accept(m.as_str()))
            .collect()
    }
}

/// Bare numbers with thousands separators or four to nine digits. Digits
/// glued to `-` or `/` belong to dates or phone numbers and are skipped.
pub struct LooseNumber;

fn is_date_joiner(c: Option<u8>) -> bool {
    matches!(c, Some(b'-') | Some(b'/'))
}

impl AmountStrategy for LooseNumber {
    fn name(&self) -> &'static str {
        "loose"
    }

    fn candidates(&self, text: &str, bounds: &AmountBounds) -> Vec<u64> {
        let bytes = text.as_bytes();
        loose_regex()
            .captures_iter(text)
            .filter_map(|cap| Some((cap.get(0)?, cap.get(1)?)))
            .filter(|(whole, _)| {
                let before = whole.start().checked_sub(1).map(|i| bytes[i]);
                let after = bytes.get(whole.end()).copied();
                !is_date_joiner(before) && !is_date_joiner(after)
            })
            .filter_map(|(_, digits)| bounds.accept(digits.as_str()))
            .collect()
    }
}

/// Runs an inner strategy only around the first occurrence of each trigger.
pub struct KeywordWindow {
    inner: Box<dyn AmountStrategy>,
    triggers: Vec<String>,
    radius: usize,
}

impl KeywordWindow {
    pub fn new(inner: Box<dyn AmountStrategy>, triggers: &[&str], radius: usize) -> Self {
        Self {
            inner,
            triggers: triggers.iter().map(|t| t.to_ascii_lowercase()).collect(),
            radius,
        }
    }

    /// Byte range around `start..end`, widened so no token is cut in half.
    fn window(text: &str, start: usize, end: usize, radius: usize) -> &str {
        let bytes = text.as_bytes();
        let mut lo = start.saturating_sub(radius);
        let mut hi = (end + radius).min(text.len());

        while lo > 0 && !bytes[lo - 1].is_ascii_whitespace() {
            lo -= 1;
        }
        while hi < text.len() && !bytes[hi].is_ascii_whitespace() {
            hi += 1;
        }
        // Whitespace is ASCII, so both ends now sit on char boundaries
        // unless they hit the ends of the text, which are boundaries too.
        &text[lo..hi]
    }
}

impl AmountStrategy for KeywordWindow {
    fn name(&self) -> &'static str {
        "keyword-window"
    }

    fn candidates(&self, text: &str, bounds: &AmountBounds) -> Vec<u64> {
        // ASCII lowering keeps byte offsets aligned with `text`.
        let lowered = text.to_ascii_lowercase();

        self.triggers
            .iter()
            .filter_map(|trigger| {
                lowered
                    .find(trigger.as_str())
                    .map(|at| Self::window(text, at, at + trigger.len(), self.radius))
            })
            .flat_map(|window| self.inner.candidates(window, bounds))
            .collect()
    }
}

/// Picks a single amount out of everything the strategies found.
pub struct AmountExtractor {
    strategies: Vec<Box<dyn AmountStrategy>>,
    bounds: AmountBounds,
}

impl AmountExtractor {
    pub fn new(strategies: Vec<Box<dyn AmountStrategy>>, bounds: AmountBounds) -> Self {
        Self { strategies, bounds }
    }

    /// Whole-text currency and loose passes plus their keyword-windowed versions.
    pub fn standard(config: &ExtractionConfig) -> Self {
        Self::new(
            vec![
                Box::new(CurrencyMarked),
                Box::new(LooseNumber),
                Box::new(KeywordWindow::new(
                    Box::new(CurrencyMarked),
                    AMOUNT_TRIGGERS,
                    config.keyword_window,
                )),
                Box::new(KeywordWindow::new(
                    Box::new(LooseNumber),
                    AMOUNT_TRIGGERS,
                    config.keyword_window,
                )),
            ],
            AmountBounds::from(config),
        )
    }

    /// Pools the candidates of every strategy and returns the largest.
    pub fn extract(&self, text: &str) -> Option<u64> {
        self.strategies
            .iter()
            .filter_map(|strategy| {
                let best = strategy.candidates(text, &self.bounds).into_iter().max()?;
                tracing::debug!(strategy = strategy.name(), amount = best, "amount candidate");
                Some(best)
            })
            .max()
    }
}

/// Date of birth next to a DOB label, else the first bare ISO date.
pub fn extract_dob(text: &str) -> Option<String> {
    labeled_dob_regex()
        .captures(text)
        .or_else(|| iso_date_regex().captures(text))
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Capitalized tokens following a name label.
pub fn extract_name(text: &str) -> Option<String> {
    let cap = name_regex().captures(text)?;
    let tokens: Vec<&str> = cap
        .get(1)?
        .as_str()
        .split(' ')
        .take_while(|token| !NAME_STOP_WORDS.contains(&token.to_ascii_lowercase().as_str()))
        .collect();

    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn extractor() -> AmountExtractor {
        AmountExtractor::standard(&ExtractionConfig::default())
    }

    #[test]
    fn test_currency_amount_truncates_cents() {
        assert_eq!(extractor().extract("$12,345.67 approved"), Some(12_345));
    }

    #[test]
    fn test_no_numbers_in_range() {
        assert_eq!(extractor().extract("Congratulations, you are approved"), None);
        assert_eq!(extractor().extract("Fee of $250 due at closing"), None);
        assert_eq!(extractor().extract("Total $250,000,000 limit"), None);
    }

    #[test]
    fn test_largest_candidate_wins_across_strategies() {
        assert_eq!(
            extractor().extract("Approved for $5,000 loan amount 48213377"),
            Some(48_213_377)
        );
        assert_eq!(
            extractor().extract("approved $2,000 verified balance 350,000"),
            Some(350_000)
        );
        let text = "Letter dated 2024 for loan 48213377. Approved for USD 450,000 purchase.";
        assert_eq!(extractor().extract(text), Some(48_213_377));
    }

    #[test]
    fn test_loose_numbers_used_without_currency_marks() {
        let text = "Available balance 87,512.10 as of statement close";
        assert_eq!(extractor().extract(text), Some(87_512));
    }

    #[test]
    fn test_largest_currency_candidate_wins() {
        let text = "Down payment $60,000. Pre-approved up to $480,000.00 for purchase price $500,000";
        assert_eq!(extractor().extract(text), Some(500_000));
    }

    #[test]
    fn test_keyword_window_does_not_cut_numbers() {
        let text = format!("{} approved 1,234,567", "x".repeat(10));
        let window = KeywordWindow::new(Box::new(LooseNumber), &["approved"], 5);
        let bounds = AmountBounds { min: 1_000, max: 100_000_000 };
        assert_eq!(window.candidates(&text, &bounds), vec![1_234_567]);
    }

    #[test]
    fn test_keyword_window_only_scans_near_trigger() {
        let filler = "lorem ".repeat(100);
        let text = format!("$9,999 {} approved amount $5,000", filler);
        let window = KeywordWindow::new(Box::new(CurrencyMarked), &["approved"], 50);
        let bounds = AmountBounds { min: 1_000, max: 100_000_000 };
        assert_eq!(window.candidates(&text, &bounds), vec![5_000]);
    }

    #[test]
    fn test_dates_and_phone_numbers_are_not_amounts() {
        assert_eq!(extractor().extract("DOB 1991-02-03 call 555-1234"), None);
        assert_eq!(extractor().extract("Issued 04/01/2024"), None);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Loan\n\tAmount:   $1,000 \r\n"), "Loan Amount: $1,000");
    }

    #[test]
    fn test_labeled_dob_wins_over_iso_date() {
        let text = "Issued 2021-04-12 DOB: 03/14/1988 Exp 2029-03-14";
        assert_eq!(extract_dob(text).as_deref(), Some("03/14/1988"));
    }

    #[test]
    fn test_birth_and_dotted_dob_labels() {
        for text in [
            "Birth 01/02/1990",
            "D.O.B. 01/02/1990",
            "D.O.B.: 01/02/1990",
            "Sex F d.o.b 01/02/1990",
            "Birthdate: 01/02/1990",
        ] {
            assert_eq!(extract_dob(text).as_deref(), Some("01/02/1990"), "{}", text);
        }
    }

    #[test]
    fn test_bare_iso_dob_fallback() {
        assert_eq!(extract_dob("Born 1990-07-01 in Ohio").as_deref(), Some("1990-07-01"));
        assert_eq!(extract_dob("no dates here"), None);
    }

    #[test]
    fn test_name_after_label() {
        assert_eq!(
            extract_name("DRIVER LICENSE Name: Jane Q Public DOB 01/02/1990").as_deref(),
            Some("Jane Q Public")
        );
        assert_eq!(
            extract_name("FULL NAME JOHN DOE ADDRESS 1 MAIN ST").as_deref(),
            Some("JOHN DOE")
        );
        assert_eq!(extract_name("name: lowercase only"), None);
    }

    proptest! {
        #[test]
        fn prop_amount_always_within_bounds(text in "[ $USDusd0-9,.a-z]{0,80}") {
            if let Some(amount) = extractor().extract(&text) {
                prop_assert!((1_000..=100_000_000).contains(&amount));
            }
        }

        #[test]
        fn prop_marked_amount_is_found(value in 1_000u64..=100_000_000) {
            let text = format!("Approved for ${} today", value);
            prop_assert_eq!(extractor().extract(&text), Some(value));
        }
    }
}
