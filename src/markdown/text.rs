//! Text helpers shared by the transform rules and the table of contents.

use maud::html;
use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static WIKI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[\[([^\]]+)\]\]").expect("wiki regex"));
static MD_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("non-word regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("space regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("dash regex"));
static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*):").expect("scheme regex"));

/// HTML-escape plain text. Maud's escaper covers `&`, `<`, `>` and `"`.
pub fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

/// Reverse [`escape`]. `&amp;` goes last so `&amp;lt;` comes back as `&lt;`.
pub fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Drop every `<...>` tag, keeping the text between them.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").into_owned()
}

/// Anchor id for a heading.
///
/// Accepts either raw markdown (`See [[My Post]]`) or the partially rendered
/// form the transform rules see (`See <a ...>My Post</a>`); both produce the
/// same id so the table of contents can link into rendered documents.
pub fn heading_id(text: &str) -> String {
    let text = unescape(&strip_tags(text));
    let text = WIKI.replace_all(&text, "$1");
    let text = MD_LINK.replace_all(&text, "$1");
    let lowered = text.trim().to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, "");
    let dashed = SPACES.replace_all(&cleaned, "-");
    DASHES.replace_all(&dashed, "-").into_owned()
}

/// Replace `[[Text]]` and `![[Text]]` with their inner text.
pub fn strip_wiki_syntax(text: &str) -> String {
    WIKI.replace_all(text, "$1").into_owned()
}

/// Neutralise link targets that could run script. Relative targets and the
/// usual web schemes pass through.
pub fn safe_href(url: &str) -> &str {
    match SCHEME.captures(url.trim_start()) {
        Some(caps) => {
            let scheme = caps[1].to_ascii_lowercase();
            match scheme.as_str() {
                "http" | "https" | "mailto" | "tel" => url,
                _ => "#",
            }
        }
        None => url,
    }
}
