use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::ClassifyError;
use crate::keywords::BONUS_PHRASES;

/// When the bonus weight for a bonus phrase is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusPolicy {
    /// Add the bonus whenever the phrase is in the keyword list, matched or not.
    #[default]
    Unconditional,
    /// Add the bonus only when the phrase itself matched the text.
    OnMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPolicy {
    /// Minimum token-set similarity (0-100) for a fuzzy line match.
    pub fuzzy_threshold: u32,
    pub bonus_weight: u32,
    pub bonus_policy: BonusPolicy,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 80,
            bonus_weight: 3,
            bonus_policy: BonusPolicy::Unconditional,
        }
    }
}

/// Keep ASCII word characters, blank everything else, lowercase and trim.
fn preprocess(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .filter(char::is_ascii)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    cleaned.trim().to_string()
}

/// Indel similarity scaled to 0-100, rounding half to even. Empty input scores 0.
fn scaled_ratio(a: &str, b: &str) -> u32 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let ratio = rapidfuzz::fuzz::ratio(a.chars(), b.chars());
    (ratio * 100.0).round_ties_even() as u32
}

fn join_with(prefix: &str, rest: &BTreeSet<&str>) -> String {
    let tail = rest.iter().copied().collect::<Vec<_>>().join(" ");
    format!("{} {}", prefix, tail).trim().to_string()
}

/// Token-set similarity between two strings (0-100).
///
/// Insensitive to word order and repeated words. When every token of one side
/// appears in the other, the score is 100.
pub fn token_set_ratio(left: &str, right: &str) -> u32 {
    let left = preprocess(left);
    let right = preprocess(right);
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();

    let sect = left_tokens
        .intersection(&right_tokens)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_left: BTreeSet<&str> = left_tokens.difference(&right_tokens).copied().collect();
    let only_right: BTreeSet<&str> = right_tokens.difference(&left_tokens).copied().collect();

    let combined_left = join_with(&sect, &only_left);
    let combined_right = join_with(&sect, &only_right);

    scaled_ratio(&sect, &combined_left)
        .max(scaled_ratio(&sect, &combined_right))
        .max(scaled_ratio(&combined_left, &combined_right))
}

/// Line boundaries for fuzzy matching. Tesseract ends each page with a
/// form feed, so that has to break lines too.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Lowercased text split the two ways keyword matching needs.
struct PreparedText<'a> {
    lowered: &'a str,
    lines: Vec<&'a str>,
    words: HashSet<&'a str>,
}

impl<'a> PreparedText<'a> {
    fn new(lowered: &'a str) -> Self {
        Self {
            lowered,
            lines: lowered
                .split(is_line_break)
                .filter(|line| !line.is_empty())
                .collect(),
            words: lowered.split_whitespace().collect(),
        }
    }

    fn best_line_similarity(&self, keyword: &str) -> u32 {
        self.lines
            .iter()
            .map(|line| token_set_ratio(keyword, line))
            .max()
            .unwrap_or(0)
    }

    fn contains_all_words(&self, keyword: &str) -> bool {
        keyword.split_whitespace().all(|w| self.words.contains(w))
    }
}

/// Whether a single lowercase keyword matches the prepared text.
fn keyword_matches(text: &PreparedText<'_>, keyword: &str, policy: &ScoringPolicy) -> bool {
    text.lowered.contains(keyword)
        || text.contains_all_words(keyword)
        || text.best_line_similarity(keyword) >= policy.fuzzy_threshold
}

/// Score `text` against `keywords` without any QR signal.
pub fn keyword_match_count(text: &str, keywords: &[&str], policy: &ScoringPolicy) -> u32 {
    let lowered = text.to_lowercase();
    let prepared = PreparedText::new(&lowered);

    let mut matched = 0;
    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        let hit = keyword_matches(&prepared, &keyword, policy);
        if hit {
            matched += 1;
        }

        let is_bonus = BONUS_PHRASES.contains(&keyword.as_str());
        let bonus_applies = match policy.bonus_policy {
            BonusPolicy::Unconditional => is_bonus,
            BonusPolicy::OnMatch => is_bonus && hit,
        };
        if bonus_applies {
            matched += policy.bonus_weight;
        }

        tracing::trace!(keyword = %keyword, hit, bonus = bonus_applies, "keyword scored");
    }
    matched
}

/// Score `text` against `keywords`, adding one point when `qr_probe` reports a
/// QR code. The probe runs at most once, after the keywords.
pub fn score<F>(
    text: &str,
    keywords: &[&str],
    policy: &ScoringPolicy,
    qr_probe: Option<F>,
) -> Result<u32, ClassifyError>
where
    F: FnOnce() -> Result<bool, ClassifyError>,
{
    let mut matched = keyword_match_count(text, keywords, policy);
    if let Some(probe) = qr_probe {
        if probe()? {
            matched += 1;
        }
    }
    Ok(matched)
}
