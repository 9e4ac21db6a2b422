//! Ranking extraction for Stage 2.
//!
//! Raters are free-text models. They are asked to end with a
//! `FINAL RANKING:` block, but do not always comply, so extraction runs in
//! tiers and reports which tier produced the order.
//!
//! | Strategy | When | What is read |
//! |----------|------|--------------|
//! | [`ParseStrategy::Strict`] | header found | list items after the last header that has any, until the first non-item line |
//! | [`ParseStrategy::SectionScan`] | header found, strict gave nothing | every `Response X` after the last header that has any |
//! | [`ParseStrategy::FullTextScan`] | otherwise | every `Response X` in the whole text |
//! | [`ParseStrategy::None`] | nothing found | empty order |
//!
//! In every tier labels outside the valid set are dropped and repeats are
//! ignored (first occurrence wins). The order is never rearranged.
//!
//! # Examples
//!
//! ```
//! use council_domain::council::label::Label;
//! use council_domain::council::parsing::{parse_ranking, ParseStrategy};
//!
//! let valid: Vec<Label> = (0..3).map(Label::from_index).collect();
//! let text = "A is thin, C is thorough.\n\nFINAL RANKING:\n1. Response C\n2. Response A\n3. Response B";
//! let parsed = parse_ranking(text, &valid);
//!
//! assert_eq!(parsed.strategy, ParseStrategy::Strict);
//! let order: Vec<&str> = parsed.order.iter().map(|l| l.as_str()).collect();
//! assert_eq!(order, vec!["C", "A", "B"]);
//! ```

use crate::council::label::Label;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)final[\s*_`]+ranking[\s*_`]*:").expect("header pattern is valid")
});

static LABEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Response|RESPONSE)\s+([A-Z]{1,3})\b").expect("label pattern is valid")
});

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+\s*[.):]|[-+•])\s*(.*)$").expect("list item pattern is valid")
});

/// Which extraction tier produced a [`ParsedRanking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    /// Ordered list items after the `FINAL RANKING:` header.
    Strict,
    /// Loose scan of the text after the header.
    SectionScan,
    /// Loose scan of the whole text.
    FullTextScan,
    /// Nothing recognisable; the order is empty.
    None,
}

impl ParseStrategy {
    /// Whether a fallback tier was needed.
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseStrategy::SectionScan | ParseStrategy::FullTextScan)
    }
}

/// Labels extracted from one rater's reply, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRanking {
    pub order: Vec<Label>,
    pub strategy: ParseStrategy,
}

impl ParsedRanking {
    fn empty() -> Self {
        Self {
            order: Vec::new(),
            strategy: ParseStrategy::None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Extract a rater's ordering from its raw reply.
///
/// Never fails: an unparseable reply yields an empty order with
/// [`ParseStrategy::None`].
pub fn parse_ranking(text: &str, valid: &[Label]) -> ParsedRanking {
    let valid: HashSet<&Label> = valid.iter().collect();

    // Later headers win, but a header that is only prose gives way to an
    // earlier one that has a ranking after it.
    let sections: Vec<&str> = HEADER
        .find_iter(text)
        .map(|m| &text[m.end()..])
        .collect();

    if let Some(order) = sections
        .iter()
        .rev()
        .map(|section| parse_strict(section, &valid))
        .find(|order| !order.is_empty())
    {
        return ParsedRanking {
            order,
            strategy: ParseStrategy::Strict,
        };
    }

    if let Some(order) = sections
        .iter()
        .rev()
        .map(|section| scan_tokens(section, &valid))
        .find(|order| !order.is_empty())
    {
        return ParsedRanking {
            order,
            strategy: ParseStrategy::SectionScan,
        };
    }

    let order = scan_tokens(text, &valid);
    if !order.is_empty() {
        return ParsedRanking {
            order,
            strategy: ParseStrategy::FullTextScan,
        };
    }

    ParsedRanking::empty()
}

/// Read list items line by line, stopping at the first line that is not a
/// single-label list item. Blank lines are skipped.
fn parse_strict(section: &str, valid: &HashSet<&Label>) -> Vec<Label> {
    let mut order = OrderBuilder::new(valid);

    for line in section.lines() {
        if strip_emphasis(line).trim().is_empty() {
            continue;
        }
        match list_item_label(line) {
            Some(label) => order.push(label),
            None => break,
        }
    }

    order.finish()
}

/// The single label a list-item line names, or `None` if the line is not a
/// list item or names zero or several distinct labels.
fn list_item_label(line: &str) -> Option<Label> {
    let trimmed = line.trim().trim_start_matches(['#', '>']).trim_start();
    let star_bullet = trimmed.starts_with("* ");
    let cleaned = strip_emphasis(trimmed);
    let cleaned = cleaned.trim();

    let body = if star_bullet {
        cleaned
    } else {
        LIST_ITEM.captures(cleaned)?.get(1)?.as_str()
    };

    let mut found: Option<Label> = None;
    for caps in LABEL_TOKEN.captures_iter(body) {
        let label = Label::parse(&caps[1])?;
        match &found {
            None => found = Some(label),
            Some(existing) if *existing == label => {}
            Some(_) => return None,
        }
    }
    found
}

/// Every valid `Response X` token in order of first appearance.
fn scan_tokens(text: &str, valid: &HashSet<&Label>) -> Vec<Label> {
    let cleaned = strip_emphasis(text);
    let mut order = OrderBuilder::new(valid);
    for caps in LABEL_TOKEN.captures_iter(&cleaned) {
        if let Some(label) = Label::parse(&caps[1]) {
            order.push(label);
        }
    }
    order.finish()
}

/// Markdown emphasis around tokens (`**Response B**`, `` `Response B` ``)
/// would otherwise hide them from the patterns.
fn strip_emphasis(s: &str) -> String {
    s.chars().filter(|c| !matches!(c, '*' | '_' | '`')).collect()
}

/// Keeps valid labels in arrival order, dropping repeats.
struct OrderBuilder<'a> {
    valid: &'a HashSet<&'a Label>,
    seen: HashSet<Label>,
    order: Vec<Label>,
}

impl<'a> OrderBuilder<'a> {
    fn new(valid: &'a HashSet<&'a Label>) -> Self {
        Self {
            valid,
            seen: HashSet::new(),
            order: Vec::new(),
        }
    }

    fn push(&mut self, label: Label) {
        if self.valid.contains(&label) && self.seen.insert(label.clone()) {
            self.order.push(label);
        }
    }

    fn finish(self) -> Vec<Label> {
        self.order
    }
}
