//! Deterministic category scoring.
//!
//! Each keyword hit adds 1, each pattern hit adds 2. The highest score wins;
//! ties go to the category declared first. With nothing matched the request
//! is treated as research.

use lingo_core::Category;

use crate::grammar::CompiledGrammar;

const KEYWORD_WEIGHT: u32 = 1;
const PATTERN_WEIGHT: u32 = 2;

/// Confidence reported when nothing matched
pub const NO_MATCH_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u32,
    pub keyword_hits: Vec<String>,
    pub pattern_hits: usize,
}

/// Result of the fallback matcher
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub primary: Category,
    /// Nonzero-scoring categories other than primary, best first
    pub secondary: Vec<Category>,
    pub confidence: f64,
    pub reasoning: String,
    pub scores: Vec<CategoryScore>,
}

/// Score every category against normalized text, in `Category::ALL` order
pub fn score_text(text: &str, grammar: &CompiledGrammar) -> Vec<CategoryScore> {
    Category::ALL
        .iter()
        .map(|&category| {
            let Some(rule) = grammar.rule(category) else {
                return CategoryScore {
                    category,
                    score: 0,
                    keyword_hits: Vec::new(),
                    pattern_hits: 0,
                };
            };

            let keyword_hits: Vec<String> = rule
                .keywords
                .iter()
                .filter(|k| k.regex.is_match(text))
                .map(|k| k.original.clone())
                .collect();
            let pattern_hits = rule.patterns.iter().filter(|p| p.regex.is_match(text)).count();

            CategoryScore {
                category,
                score: keyword_hits.len() as u32 * KEYWORD_WEIGHT
                    + pattern_hits as u32 * PATTERN_WEIGHT,
                keyword_hits,
                pattern_hits,
            }
        })
        .collect()
}

/// Classify normalized text with the grammar alone
pub fn match_text(text: &str, grammar: &CompiledGrammar) -> PatternMatch {
    let scores = score_text(text, grammar);

    let best = scores
        .iter()
        .fold(None::<&CategoryScore>, |best, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(s),
        });

    let max_score = best.map(|b| b.score).unwrap_or(0);
    if max_score == 0 {
        return PatternMatch {
            primary: Category::Research,
            secondary: Vec::new(),
            confidence: NO_MATCH_CONFIDENCE,
            reasoning: "No clear match; defaulting to research".to_string(),
            scores,
        };
    }

    let primary = best.map(|b| b.category).unwrap_or(Category::Research);

    let mut ranked: Vec<&CategoryScore> = scores
        .iter()
        .filter(|s| s.score > 0 && s.category != primary)
        .collect();
    // stable sort keeps declaration order among equal scores
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    let secondary: Vec<Category> = ranked.iter().map(|s| s.category).collect();

    let confidence = (max_score as f64 / 3.0).min(1.0);
    let reasoning = format!(
        "Pattern match: {}",
        std::iter::once(best)
            .flatten()
            .chain(ranked.iter().copied())
            .map(|s| format!("{} (score {})", s.category, s.score))
            .collect::<Vec<_>>()
            .join(", ")
    );

    PatternMatch {
        primary,
        secondary,
        confidence,
        reasoning,
        scores,
    }
}
