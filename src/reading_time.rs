//! Reading time estimate shown on post cards and post headers.
//!
//! Words are counted over the text a reader actually reads: code blocks,
//! inline code, images and raw HTML are dropped, link text is kept. Wiki link
//! brackets do not count as words of their own.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Average adult reading speed.
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// Site languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
}

/// Estimated minutes to read a piece of content. Never less than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ReadingTime {
    pub minutes: u32,
    pub words: usize,
}

impl ReadingTime {
    pub fn label(&self, language: Language) -> String {
        match language {
            Language::En => format!("{} min read", self.minutes),
            Language::Tr => format!("{} dk okuma", self.minutes),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(Language::En))
    }
}

/// Readable words in markdown content.
pub fn count_words(content: &str) -> usize {
    let mut text = String::with_capacity(content.len());
    let mut skip_depth = 0usize;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Start(Tag::Image { .. }) => skip_depth += 1,
            Event::End(TagEnd::CodeBlock) | Event::End(TagEnd::Image) => {
                skip_depth = skip_depth.saturating_sub(1);
            }
            Event::Text(t) if skip_depth == 0 => text.push_str(&t),
            Event::SoftBreak
            | Event::HardBreak
            | Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::BlockQuote(_)
                | TagEnd::TableCell,
            ) => text.push(' '),
            _ => {}
        }
    }

    text.split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .count()
}

pub fn reading_time(content: &str, words_per_minute: u32) -> ReadingTime {
    let words = count_words(content);
    let wpm = words_per_minute.max(1) as usize;
    let minutes = words.div_ceil(wpm).max(1);
    ReadingTime {
        minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        words,
    }
}
