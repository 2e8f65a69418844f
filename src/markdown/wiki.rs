//! Wiki-style syntax: `![[file]]` image embeds and `[[Link Text]]` links.
//!
//! Both rules run on escaped prose. Image embeds become ordinary markdown
//! image references so the image rule later decides between a plain `<img>`
//! and a photo frame. Wiki links become anchors immediately; turning the slug
//! into a route happens on click, see [`crate::interaction`].

use super::stash::Stash;
use super::text::{escape, unescape};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Classes on generated wiki links. `wiki-link` is what click delegation keys on.
pub const WIKI_LINK_CLASS: &str = "wiki-link text-primary underline decoration-primary/30 hover:decoration-primary bg-primary/5 px-1 rounded transition-all duration-150";

/// Characters left alone by `encodeURIComponent`, minus `(`, `)`, `*` and `'`
/// which would otherwise collide with markdown syntax further down the pipeline.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~');

static WIKI_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").expect("wiki image regex"));
static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wiki link regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space regex"));

/// Derive a document slug from wiki link text: lower-cased, whitespace runs
/// replaced by `-`.
///
/// ```
/// assert_eq!(folio_render::markdown::wiki_slug("My Post"), "my-post");
/// ```
pub fn wiki_slug(text: &str) -> String {
    WHITESPACE
        .replace_all(&text.to_lowercase(), "-")
        .into_owned()
}

/// Percent-encode a file name for the image endpoint.
pub fn encode_filename(name: &str) -> String {
    utf8_percent_encode(name, COMPONENT).to_string()
}

/// Rewrite `![[file]]` into `![file](<endpoint>/<encoded file>)`.
pub fn rewrite_image_embeds(escaped: &str, endpoint: &str) -> String {
    WIKI_IMAGE
        .replace_all(escaped, |caps: &Captures| {
            let name = unescape(&caps[1]);
            format!(
                "![{}]({}/{})",
                escape(&name),
                endpoint,
                encode_filename(&name)
            )
        })
        .into_owned()
}

/// Rewrite `[[Link Text]]` into a wiki anchor pointing at `<route>/<slug>`.
///
/// The opening tag is held in `stash`; the link text stays in place so the
/// emphasis rules still apply to it.
pub(crate) fn rewrite_links(escaped: &str, route: &str, stash: &mut Stash) -> String {
    WIKI_LINK
        .replace_all(escaped, |caps: &Captures| {
            let text = unescape(&caps[1]);
            let slug = wiki_slug(&text);
            let href = format!("{}/{slug}", route.trim_end_matches('/'));
            let open = format!(
                r#"<a href="{}" class="{WIKI_LINK_CLASS}" data-wiki-slug="{}">"#,
                escape(&href),
                escape(&slug)
            );
            format!("{}{}</a>", stash.hold(open), &caps[1])
        })
        .into_owned()
}
