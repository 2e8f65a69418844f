//! # Folio Render
//!
//! The markdown rendering pipeline behind the detail pages of a bilingual
//! blog and photo portfolio. Posts, project pages and photo pages arrive as
//! front-matter-free markdown; this crate turns them into HTML, resolves wiki
//! links and media embeds, and models the click interactions the rendered
//! page supports.
//!
//! # Architecture
//!
//! ```text
//! markdown ──render──► RenderedDocument ──► RenderView ◄── clicks
//!    │                                          │
//!    ├─ table_of_contents                       ├─ Navigate(route)
//!    └─ reading_time                            ├─ FetchExif ──► metadata ──► exif
//!                                               └─ ScheduleClear
//! ```
//!
//! Rendering is a pure function of the markdown and [`markdown::RenderOptions`].
//! Everything stateful lives in [`interaction::RenderView`], which never does
//! I/O itself: it returns effects for the host to carry out and accepts their
//! results back, tagged with the ticket they were issued for.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markdown`] | Text transform stage: fences, wiki links, headings, images, links, emphasis, lists, paragraphs |
//! | [`embed`] | Classifies bare URL lines (YouTube, Twitter/X, Spotify, video files) and renders embeds |
//! | [`interaction`] | Click classification and the [`interaction::RenderView`] that owns a rendered document |
//! | [`lightbox`] | Lightbox state machine and overlay markup |
//! | [`metadata`] | Image sources and on-demand EXIF lookup |
//! | [`exif`] | Bounds-checked EXIF parser for JPEG, PNG and TIFF |
//! | [`toc`] | Heading outline with ids matching the rendered headings |
//! | [`reading_time`] | Word count and "N min read" labels in English and Turkish |
//! | [`preview`] | Standalone HTML page around a rendered post |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Ordered Rewrites, Not a CommonMark Parser
//!
//! Post bodies are written against a small, fixed dialect. The renderer applies
//! its rules in a fixed order and the resulting class names are what the site's
//! stylesheet targets, so output stays byte-compatible with existing pages.
//! `pulldown-cmark` is still used where a real parse is worth it: counting
//! words and finding headings outside code blocks.
//!
//! ## Escape First
//!
//! Prose is HTML-escaped before any rule runs, and every generated element is
//! built with Maud, which escapes interpolated values. Captured text is
//! unescaped before it is handed to Maud so nothing is escaped twice. Link
//! targets with script-capable schemes are replaced with `#`.
//!
//! Generated tags are swapped for placeholder tokens as soon as they exist and
//! only put back after the last rule, so no rule rewrites inside an attribute
//! another rule produced.
//!
//! ## Effects Instead of Callbacks
//!
//! Opening a photo frame asks the host to fetch EXIF; closing asks it to call
//! back after the fade-out. Each request carries a [`lightbox::Ticket`], and a
//! result for an older ticket is dropped. Opening image B while image A's
//! metadata is still loading can therefore never show A's metadata on B.

pub mod config;
pub mod embed;
pub mod exif;
pub mod interaction;
pub mod lightbox;
pub mod markdown;
pub mod metadata;
pub mod output;
pub mod preview;
pub mod reading_time;
pub mod toc;

#[cfg(test)]
pub(crate) mod test_helpers;
