//! Tolerant extraction of insights and recommendations from free text.
//!
//! A response that yields nothing is an error so the narrator can fall back.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ProviderError;
use crate::types::{Priority, Recommendation, RecommendationKind};

/// Numbered (`1.`, `2)`) or bulleted (`-`, `*`, `•`) list item.
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+(.+?)\s*$").expect("list item pattern is valid")
});

/// List marker in front of a numbered or bulleted section header.
static HEADER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+[.)]|[-*•])\s+").expect("header marker pattern is valid")
});

/// Longest line still treated as a section header.
const MAX_HEADER_LEN: usize = 40;

/// Most words in a header, qualifiers included ("Key Insights").
const MAX_HEADER_WORDS: usize = 3;

/// Items parsed from a provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Insights,
    Recommendations,
}

/// Parse a provider response into insights and recommendations.
///
/// The first three recommendations are high priority, the rest medium.
pub fn parse_response(text: &str) -> Result<ParsedResponse, ProviderError> {
    let mut section = None;
    let mut insights: Vec<String> = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(next) = header(trimmed) {
            section = Some(next);
            continue;
        }
        let Some(current) = section else {
            continue;
        };
        let bucket = match current {
            Section::Insights => &mut insights,
            Section::Recommendations => &mut recommendations,
        };
        if let Some(caps) = LIST_ITEM.captures(trimmed) {
            let item = clean(&caps[1]);
            if !item.is_empty() {
                bucket.push(item);
            }
        } else if let Some(last) = bucket.last_mut() {
            last.push(' ');
            last.push_str(&clean(trimmed));
        }
    }

    if insights.is_empty() && recommendations.is_empty() {
        return Err(ProviderError::Unparseable(format!(
            "no insights or recommendations found in {} bytes",
            text.len()
        )));
    }

    let recommendations = recommendations
        .into_iter()
        .enumerate()
        .map(|(idx, item)| to_recommendation(idx, &item))
        .collect();

    Ok(ParsedResponse {
        insights,
        recommendations,
    })
}

/// A header is a short keyword line, optionally numbered, bulleted,
/// emphasized or followed by a colon. List items with content are not.
fn header(line: &str) -> Option<Section> {
    let line = line.trim_start_matches(['#', ' ']);
    let unmarked = HEADER_MARKER.replace(line, "");
    let stripped = unmarked
        .trim_start_matches(['#', '*', '_', ' '])
        .trim_end_matches([':', '*', '_', ' '])
        .to_lowercase();
    if stripped.len() > MAX_HEADER_LEN
        || stripped.contains(':')
        || stripped.split_whitespace().count() > MAX_HEADER_WORDS
    {
        return None;
    }
    if stripped.contains("insight") {
        Some(Section::Insights)
    } else if stripped.contains("recommendation") {
        Some(Section::Recommendations)
    } else {
        None
    }
}

fn clean(text: &str) -> String {
    text.replace("**", "").replace("__", "").trim().to_string()
}

fn to_recommendation(idx: usize, item: &str) -> Recommendation {
    let priority = if idx < 3 {
        Priority::High
    } else {
        Priority::Medium
    };
    let (title, description) = match item.split_once(':') {
        Some((title, rest))
            if !title.trim().is_empty() && title.len() <= 80 && !rest.trim().is_empty() =>
        {
            (title.trim().to_string(), rest.trim().to_string())
        }
        _ => (item.to_string(), item.to_string()),
    };
    Recommendation::new(RecommendationKind::AiGenerated, priority, title, description)
}
