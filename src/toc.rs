//! Table of contents for long posts.
//!
//! Only `##` and `###` headings are listed: `#` is normally the post title,
//! and deeper levels are not rendered as headings at all. Entry ids are
//! computed with [`heading_id`] from the same source text the renderer sees,
//! so `#<id>` always lands on the rendered heading.
//!
//! Headings are found with pulldown-cmark so that `## not a heading` inside a
//! fenced code block is ignored, then filtered to the ATX form the renderer
//! recognises (`## Title` at the start of a line, one space after the hashes).

use crate::markdown::heading_id;
use crate::markdown::text::strip_wiki_syntax;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableOfContents {
    pub entries: Vec<TocEntry>,
}

impl TableOfContents {
    /// A single heading does not make an outline worth showing.
    pub fn is_worth_showing(&self) -> bool {
        self.entries.len() >= 2
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct OpenHeading {
    level: u8,
    source: String,
    text: String,
}

/// Source-line prefix the renderer turns into a heading of `level`.
fn atx_prefix(level: u8) -> &'static str {
    if level == 2 { "## " } else { "### " }
}

pub fn table_of_contents(content: &str) -> TableOfContents {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut entries = Vec::new();
    let mut open: Option<OpenHeading> = None;

    for (event, range) in Parser::new(&normalized).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let level = match level {
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    _ => continue,
                };
                let source = normalized[range].lines().next().unwrap_or_default();
                let Some(inner) = source.strip_prefix(atx_prefix(level)) else {
                    continue;
                };
                open = Some(OpenHeading {
                    level,
                    source: inner.to_string(),
                    text: String::new(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(heading) = open.as_mut() {
                    heading.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(heading) = open.take() {
                    let text = strip_wiki_syntax(heading.text.trim());
                    entries.push(TocEntry {
                        id: heading_id(&heading.source),
                        text,
                        level: heading.level,
                    });
                }
            }
            _ => {}
        }
    }

    TableOfContents { entries }
}
