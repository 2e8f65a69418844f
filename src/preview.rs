//! Standalone HTML page for previewing a rendered post.
//!
//! Wraps a [`RenderedDocument`] with a title, reading time label and, for
//! posts with enough headings, a table of contents linking to the heading ids.

use crate::markdown::RenderedDocument;
use crate::reading_time::{Language, ReadingTime};
use crate::toc::TableOfContents;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/prose.css");

pub struct PreviewInput<'a> {
    pub document: &'a RenderedDocument,
    pub toc: &'a TableOfContents,
    pub reading_time: ReadingTime,
    pub language: Language,
}

fn html_lang(language: Language) -> &'static str {
    match language {
        Language::En => "en",
        Language::Tr => "tr",
    }
}

fn toc_title(language: Language) -> &'static str {
    match language {
        Language::En => "Contents",
        Language::Tr => "İçindekiler",
    }
}

fn base_document(title: &str, lang: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Table of contents sidebar. Empty when there is nothing worth outlining.
pub fn render_toc(toc: &TableOfContents, language: Language) -> Markup {
    if !toc.is_worth_showing() {
        return html! {};
    }
    html! {
        nav.toc aria-label=(toc_title(language)) {
            p.toc-title { (toc_title(language)) }
            ul {
                @for entry in &toc.entries {
                    li class={ "toc-level-" (entry.level) } {
                        a href={ "#" (entry.id) } { (entry.text) }
                    }
                }
            }
        }
    }
}

pub fn render_page(title: &str, input: &PreviewInput<'_>) -> Markup {
    let toc = render_toc(input.toc, input.language);
    let has_toc = input.toc.is_worth_showing();
    let content = html! {
        div.page.has-toc[has_toc] {
            article {
                header.page-header {
                    h1 { (title) }
                    p.reading-time { (input.reading_time.label(input.language)) }
                }
                (PreEscaped(input.document.as_str()))
            }
            (toc)
        }
    };
    base_document(title, html_lang(input.language), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{RenderOptions, render};
    use crate::reading_time::reading_time;
    use crate::toc::table_of_contents;

    fn page(md: &str, language: Language) -> String {
        let document = render(md, &RenderOptions::default());
        let toc = table_of_contents(md);
        let input = PreviewInput {
            document: &document,
            toc: &toc,
            reading_time: reading_time(md, 200),
            language,
        };
        render_page("A <Post>", &input).into_string()
    }

    #[test]
    fn page_is_a_full_document() {
        let html = page("hello", Language::En);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains("<title>A &lt;Post&gt;</title>"));
        assert!(html.contains(".photo-frame"));
        assert!(html.contains(r#"<div class="prose-content">"#));
    }

    #[test]
    fn reading_time_label_follows_language() {
        assert!(page("hello", Language::En).contains("1 min read"));
        let tr = page("merhaba", Language::Tr);
        assert!(tr.contains("1 dk okuma"));
        assert!(tr.contains(r#"<html lang="tr">"#));
    }

    #[test]
    fn toc_links_to_heading_ids() {
        let html = page("## Gear\n\ntext\n\n### Lenses", Language::En);
        assert!(html.contains(r##"<a href="#gear">Gear</a>"##));
        assert!(html.contains(r#"class="toc-level-3""#));
        assert!(html.contains(r#"class="page has-toc""#));
        assert!(html.contains(r#"id="gear""#));
    }

    #[test]
    fn single_heading_has_no_toc() {
        let html = page("## Only", Language::En);
        assert!(!html.contains(r#"class="toc""#));
        assert!(!html.contains("has-toc"));
    }
}
