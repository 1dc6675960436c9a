//! Category parameter extraction.
//!
//! Runs on every classified intent regardless of which path picked the
//! categories, so downstream steps always see the same parameter shapes.

use lazy_static::lazy_static;
use lingo_core::{
    Category, IntentParams, Length, SummarizeParams, SummaryType, TranslateParams, WriteParams,
};
use regex::Regex;

use crate::language;

lazy_static! {
    static ref HEADLINE_CUE: Regex = Regex::new(r"\b(headline|title|one[\s-]liner)\b").unwrap();
    static ref TLDR_CUE: Regex =
        Regex::new(r"(\btl;?dr\b|\bone[\s-](sentence|line)\b|\bin a nutshell\b)").unwrap();
    static ref TEASER_CUE: Regex = Regex::new(r"\b(teaser|hook|preview|blurb)\b").unwrap();

    static ref SHORT_CUE: Regex =
        Regex::new(r"\b(brief|briefly|short|quick|concise|few words)\b").unwrap();
    static ref LONG_CUE: Regex = Regex::new(
        r"\b(detailed|long|in[\s-]depth|comprehensive|thorough|elaborate|full)\b"
    ).unwrap();

    static ref TONE_CUE: Regex = Regex::new(
        r"\b(formal|professional|casual|informal|friendly|polite|persuasive|neutral)\b"
    ).unwrap();
    static ref MARKDOWN_CUE: Regex =
        Regex::new(r"\b(markdown|bullet(ed)?|bullets|list|headings)\b").unwrap();
}

/// Summary type and length from cue words; key-points/medium by default
pub fn summarize_params(text: &str) -> SummarizeParams {
    let kind = if HEADLINE_CUE.is_match(text) {
        SummaryType::Headline
    } else if TLDR_CUE.is_match(text) {
        SummaryType::Tldr
    } else if TEASER_CUE.is_match(text) {
        SummaryType::Teaser
    } else {
        SummaryType::KeyPoints
    };

    SummarizeParams {
        kind,
        length: length_cue(text),
    }
}

/// Source defaults to "auto", target to the configured default language
pub fn translate_params(text: &str, default_language: &str) -> TranslateParams {
    TranslateParams {
        source_language: language::find_source_language(text)
            .unwrap_or("auto")
            .to_string(),
        target_language: language::find_target_language(text)
            .unwrap_or(default_language)
            .to_string(),
    }
}

pub fn write_params(text: &str) -> WriteParams {
    let tone = TONE_CUE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| match m.as_str() {
            "informal" => "casual",
            "polite" => "formal",
            other => other,
        })
        .unwrap_or("neutral");

    WriteParams {
        tone: tone.to_string(),
        length: length_cue(text),
        format: if MARKDOWN_CUE.is_match(text) {
            "markdown".to_string()
        } else {
            "plain-text".to_string()
        },
    }
}

/// Parameters for every category the intent names
pub fn extract_params(
    categories: impl IntoIterator<Item = Category>,
    text: &str,
    default_language: &str,
) -> IntentParams {
    let mut params = IntentParams::default();
    for category in categories {
        match category {
            Category::Summarize => params.summarize = Some(summarize_params(text)),
            Category::Translate => {
                params.translate = Some(translate_params(text, default_language))
            }
            Category::Write => params.write = Some(write_params(text)),
            Category::Research => {}
        }
    }
    params
}

fn length_cue(text: &str) -> Length {
    if SHORT_CUE.is_match(text) {
        Length::Short
    } else if LONG_CUE.is_match(text) {
        Length::Long
    } else {
        Length::Medium
    }
}
