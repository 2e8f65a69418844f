//! Prose rules, applied in order to escaped, non-code text.
//!
//! Every rule is a plain regex rewrite over the whole segment. Later rules see
//! the output of earlier ones, so the order in [`apply`] is load-bearing: the
//! image rule must run before the link rule (an image is a link with a `!`),
//! bold must run before italic, and list items must exist before paragraphs
//! are split.
//!
//! Images and link anchors go into the `Stash` as soon as they are built,
//! so emphasis and code spans never rewrite inside their attributes.

use super::RenderOptions;
use super::stash::Stash;
use super::text::{escape, heading_id, safe_href};
use maud::{Markup, html};
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const PARAGRAPH_OPEN: &str = r#"<p class="mb-4 leading-relaxed">"#;

const H1_CLASS: &str = "text-3xl md:text-4xl font-semibold mt-12 mb-6";
const H2_CLASS: &str = "text-2xl md:text-3xl font-semibold mt-10 mb-4";
const H3_CLASS: &str = "text-xl md:text-2xl font-semibold mt-8 mb-4";
const IMG_CLASS: &str = "rounded-lg my-6 w-full";
const LINK_CLASS: &str = "text-primary underline hover:text-primary/80 transition-colors duration-150";
const CODE_CLASS: &str = "bg-muted px-2 py-1 rounded text-sm";
const QUOTE_CLASS: &str = "border-l-4 border-primary pl-4 italic text-muted-foreground my-4";
const LI_CLASS: &str = "ml-4";

static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.+)$").expect("h3 regex"));
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.+)$").expect("h2 regex"));
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").expect("h1 regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("image regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("code span regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("italic regex"));
static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^&gt; (.+)$").expect("quote regex"));
static UL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- .+(?:\n- .+)*").expect("ul regex"));
static OL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\. .+(?:\n\d+\. .+)*").expect("ol regex"));
static OL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\. ").expect("ol marker regex"));

/// Run every prose rule over one escaped segment. The result still carries
/// stash tokens.
pub(crate) fn apply(segment: &str, options: &RenderOptions, stash: &mut Stash) -> String {
    let s = headings(segment, stash);
    let s = images(&s, options.enable_frames, stash);
    let s = links(&s, stash);
    let s = CODE_SPAN
        .replace_all(&s, format!(r#"<code class="{CODE_CLASS}">$1</code>"#).as_str())
        .into_owned();
    let s = BOLD
        .replace_all(&s, r#"<strong class="font-semibold">$1</strong>"#)
        .into_owned();
    let s = ITALIC
        .replace_all(&s, r#"<em class="italic">$1</em>"#)
        .into_owned();
    let s = QUOTE
        .replace_all(&s, format!(r#"<blockquote class="{QUOTE_CLASS}">$1</blockquote>"#).as_str())
        .into_owned();
    let s = unordered_lists(&s);
    let s = ordered_lists(&s);
    s.replace("\n\n", &format!("</p>{PARAGRAPH_OPEN}"))
}

fn headings(s: &str, stash: &Stash) -> String {
    let s = heading_level(&H3, s, "h3", H3_CLASS, stash);
    let s = heading_level(&H2, &s, "h2", H2_CLASS, stash);
    heading_level(&H1, &s, "h1", H1_CLASS, stash)
}

fn heading_level(re: &Regex, s: &str, tag: &str, class: &str, stash: &Stash) -> String {
    re.replace_all(s, |caps: &Captures| {
        let inner = &caps[1];
        let id = heading_id(&stash.restore(inner));
        format!(r#"<{tag} id="{id}" class="{class}">{inner}</{tag}>"#)
    })
    .into_owned()
}

fn images(s: &str, enable_frames: bool, stash: &mut Stash) -> String {
    IMAGE
        .replace_all(s, |caps: &Captures| {
            let alt = stash.plain_text(&caps[1]);
            let src = stash.plain_text(&caps[2]);
            let src = safe_href(&src);
            let markup = if enable_frames {
                photo_frame(src, &alt)
            } else {
                html! { img src=(src) alt=(alt) class=(IMG_CLASS) loading="lazy"; }
            };
            stash.hold(markup.into_string())
        })
        .into_owned()
}

/// A clickable figure the interaction layer opens in the lightbox.
pub fn photo_frame(src: &str, alt: &str) -> Markup {
    html! {
        figure class="photo-frame" data-img-src=(src) data-img-alt=(alt) {
            div class="photo-frame-inner" {
                img src=(src) alt=(alt) loading="lazy";
            }
            @if !alt.is_empty() {
                figcaption { (alt) }
            }
        }
    }
}

fn links(s: &str, stash: &mut Stash) -> String {
    LINK.replace_all(s, |caps: &Captures| {
        let href = stash.plain_text(&caps[2]);
        let open = format!(
            r#"<a href="{}" class="{LINK_CLASS}" target="_blank" rel="noopener noreferrer">"#,
            escape(safe_href(&href))
        );
        // Link text is escaped prose; later rules still apply to it.
        format!("{}{}</a>", stash.hold(open), &caps[1])
    })
    .into_owned()
}

fn unordered_lists(s: &str) -> String {
    UL_RUN
        .replace_all(s, |caps: &Captures| {
            let items = caps[0]
                .split('\n')
                .map(|line| list_item(&line[2..]))
                .collect::<Vec<_>>()
                .join("\n");
            format!(r#"<ul class="list-disc my-4 space-y-2">{items}</ul>"#)
        })
        .into_owned()
}

fn ordered_lists(s: &str) -> String {
    OL_RUN
        .replace_all(s, |caps: &Captures| {
            let items = caps[0]
                .split('\n')
                .map(|line| list_item(&OL_MARKER.replace(line, "")))
                .collect::<Vec<_>>()
                .join("\n");
            format!(r#"<ol class="list-decimal my-4 space-y-2">{items}</ol>"#)
        })
        .into_owned()
}

fn list_item(content: &str) -> String {
    format!(r#"<li class="{LI_CLASS}">{content}</li>"#)
}
