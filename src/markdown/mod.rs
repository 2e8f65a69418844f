//! Markdown to HTML for post, project and photo detail pages.
//!
//! The renderer is a fixed sequence of text rewrites rather than a full
//! CommonMark parser. The generated markup is what the site's stylesheet and
//! click handling are written against, so the shapes here are a contract:
//!
//! | Construct | Markup |
//! |---|---|
//! | `[[Link Text]]` | `a.wiki-link[data-wiki-slug]` |
//! | `![alt](src)` with frames | `figure.photo-frame[data-img-src][data-img-alt] > div.photo-frame-inner > img`, optional `figcaption` |
//! | fenced code | `pre > code`, contents escaped |
//! | bare URL line | `div.embed.embed-<kind>` around an `iframe` or `video` |
//!
//! ## Pipeline
//!
//! ```text
//! normalize line endings, escape
//!   → ![[file]] → ![file](endpoint/...)
//!   → [[Link]] → wiki anchor
//!   → bare URL lines → embeds
//!   → split on ``` fences ──────────────┐
//!   → headings, images, links, code     │ code: escape verbatim,
//!     spans, bold, italic, quotes,      │ wrap in <pre><code>
//!     lists, paragraph breaks           │
//!   → concatenate ◄─────────────────────┘
//!   → restore held markup
//!   → wrap in div.prose-content > p
//! ```
//!
//! The wiki and embed rewrites run over the whole document, fences included,
//! so a wiki link or embed URL inside a fence shows up as escaped markup in
//! the code block. Everything a stage generates is held in a `Stash`
//! until the end; later rules only ever see an opaque token in its place.
//!
//! Rendering is total. Unbalanced or malformed syntax falls through as text.

pub(crate) mod rules;
pub(crate) mod stash;
pub(crate) mod text;
mod wiki;

pub use rules::photo_frame;
pub use text::heading_id;
pub use wiki::{WIKI_LINK_CLASS, encode_filename, wiki_slug};

use crate::config::LinksConfig;
use maud::html;
use stash::Stash;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("fence regex"));
static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A```(\w+)?\n(.*?)```").expect("code block regex"));

/// Inputs to a render besides the markdown itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render images as clickable photo frames instead of plain `<img>`.
    pub enable_frames: bool,
    /// Route prefix wiki links resolve under, without trailing slash.
    pub wiki_route: String,
    /// Endpoint `![[file]]` embeds are served from, without trailing slash.
    pub image_endpoint: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_links(&LinksConfig::default(), false)
    }
}

impl RenderOptions {
    pub fn from_links(links: &LinksConfig, enable_frames: bool) -> Self {
        Self {
            enable_frames,
            wiki_route: links.wiki_route.clone(),
            image_endpoint: links.image_endpoint.clone(),
        }
    }
}

/// Rendered HTML for one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument(String);

impl RenderedDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A run of the input: either prose or a fenced code block.
#[derive(Debug, PartialEq)]
enum Segment<'a> {
    Prose(&'a str),
    Fence(&'a str),
}

fn split_fences(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in FENCE.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Prose(&text[last..m.start()]));
        }
        segments.push(Segment::Fence(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Prose(&text[last..]));
    }
    segments
}

/// Render a fence. A fence that does not have the code block shape (for
/// example ```` ```inline``` ```` with no newline) produces nothing.
///
/// The fence comes from escaped text that may hold stash tokens; the code is
/// restored to its raw form and escaped exactly once.
fn render_fence(fence: &str, stash: &Stash) -> String {
    let Some(caps) = CODE_BLOCK.captures(fence) else {
        return String::new();
    };
    let lang = caps.get(1).map(|m| m.as_str());
    let code = text::unescape(&stash.restore(caps.get(2).map_or("", |m| m.as_str())));
    let code = code.trim();
    html! {
        pre class="bg-muted p-4 rounded-md overflow-x-auto my-4" {
            code class="text-sm" data-lang=[lang] { (code) }
        }
    }
    .into_string()
}

/// Render markdown to HTML.
///
/// ```
/// use folio_render::markdown::{render, RenderOptions};
///
/// let html = render("![[photo.png]]", &RenderOptions::default());
/// assert!(html.as_str().contains(r#"src="/api/images/photo.png""#));
/// ```
pub fn render(content: &str, options: &RenderOptions) -> RenderedDocument {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let escaped = text::escape(&stash::defuse(&normalized));

    let mut stash = Stash::default();
    let s = wiki::rewrite_image_embeds(&escaped, &options.image_endpoint);
    let s = wiki::rewrite_links(&s, &options.wiki_route, &mut stash);
    let s = crate::embed::resolve_embeds_with(&s, |markup| stash.hold(markup.into_string()));

    let mut body = String::with_capacity(s.len() * 2);
    let segments = split_fences(&s);
    for segment in &segments {
        match segment {
            Segment::Prose(prose) => body.push_str(&rules::apply(prose, options, &mut stash)),
            Segment::Fence(fence) => body.push_str(&render_fence(fence, &stash)),
        }
    }
    let body = stash.restore(&body);
    tracing::trace!(
        segments = segments.len(),
        held = stash.len(),
        input_bytes = content.len(),
        output_bytes = body.len(),
        "rendered markdown"
    );

    RenderedDocument(format!(
        r#"<div class="prose-content">{}{body}</p></div>"#,
        rules::PARAGRAPH_OPEN
    ))
}
