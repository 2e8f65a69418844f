//! Bare-URL embed detection.
//!
//! A line that consists of nothing but a URL is checked against the known
//! providers in a fixed order and replaced with provider markup:
//!
//! | Order | Provider | Recognised shapes |
//! |---|---|---|
//! | 1 | YouTube | `youtube.com/watch?v=ID`, `youtube.com/embed/ID`, `youtube.com/shorts/ID`, `youtu.be/ID` |
//! | 2 | Twitter / X | `twitter.com/<user>/status/<id>`, `x.com/<user>/status/<id>` |
//! | 3 | Spotify | `open.spotify.com/{track,album,playlist,episode,show}/<id>` |
//! | 4 | Direct video | absolute or site-relative URL ending in `mp4`, `webm`, `ogg`, `mov`, `m4v` |
//!
//! First match wins. Lines that match nothing are left exactly as they were
//! and end up as ordinary paragraph text; there is no auto-linking.
//!
//! Only whole, unindented lines qualify. A URL inside a blockquote or list
//! item (`> https://youtu.be/...`) is not embedded.

use crate::markdown::stash::holds_token;
use crate::markdown::text::unescape;
use maud::{Markup, html};
use regex::Regex;
use std::sync::LazyLock;

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/(?:watch\?(?:\S*?&(?:amp;)?)?v=|embed/|shorts/)|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/]\S*)?$",
    )
    .expect("youtube regex")
});

static TWITTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.|mobile\.)?(?:twitter|x)\.com/[A-Za-z0-9_]{1,15}/status/(\d+)/?(?:\?\S*)?$")
        .expect("twitter regex")
});

static SPOTIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://open\.spotify\.com/(?:intl-[a-z]{2}(?:-[a-z]{2})?/)?(track|album|playlist|episode|show)/([A-Za-z0-9]+)(?:\?\S*)?$",
    )
    .expect("spotify regex")
});

static DIRECT_VIDEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:https?://|/)\S+\.(?i:mp4|webm|ogg|mov|m4v))(?:[?#]\S*)?$")
        .expect("video regex")
});

/// Spotify entity kinds that have an embed player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotifyKind {
    Track,
    Album,
    Playlist,
    Episode,
    Show,
}

impl SpotifyKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "track" => Some(Self::Track),
            "album" => Some(Self::Album),
            "playlist" => Some(Self::Playlist),
            "episode" => Some(Self::Episode),
            "show" => Some(Self::Show),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Playlist => "playlist",
            Self::Episode => "episode",
            Self::Show => "show",
        }
    }

    /// Player height in pixels. Tracks get the compact player.
    pub fn height(self) -> u32 {
        match self {
            Self::Track => 152,
            _ => 352,
        }
    }
}

/// A recognised embed, derived from one line and discarded after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedSpec {
    YouTube { video_id: String },
    TwitterStatus { url: String, status_id: String },
    Spotify { kind: SpotifyKind, id: String },
    DirectVideo { url: String },
}

impl EmbedSpec {
    /// Class suffix of the wrapping `div` (`embed embed-<kind>`).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::YouTube { .. } => "youtube",
            Self::TwitterStatus { .. } => "twitter",
            Self::Spotify { .. } => "spotify",
            Self::DirectVideo { .. } => "video",
        }
    }

    pub fn to_markup(&self) -> Markup {
        let class = format!("embed embed-{}", self.kind());
        html! {
            div class=(class) {
                @match self {
                    Self::YouTube { video_id } => {
                        iframe
                            src=(format!("https://www.youtube.com/embed/{video_id}"))
                            title="YouTube video player"
                            loading="lazy"
                            allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share"
                            referrerpolicy="strict-origin-when-cross-origin"
                            allowfullscreen {}
                    }
                    Self::TwitterStatus { status_id, .. } => {
                        iframe
                            src=(format!("https://platform.twitter.com/embed/Tweet.html?id={status_id}"))
                            title="Post on X"
                            loading="lazy"
                            scrolling="no"
                            allowfullscreen {}
                    }
                    Self::Spotify { kind, id } => {
                        iframe
                            src=(format!("https://open.spotify.com/embed/{}/{id}", kind.as_str()))
                            width="100%"
                            height=(kind.height())
                            loading="lazy"
                            allow="autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture" {}
                    }
                    Self::DirectVideo { url } => {
                        video src=(url) controls playsinline preload="metadata" {}
                    }
                }
            }
        }
    }
}

/// Classify a single line. `None` means no provider matched.
///
/// The line may be HTML-escaped prose (`&amp;` in query strings); captured
/// URLs are unescaped before they go into markup, which escapes them again.
pub fn classify_line(line: &str) -> Option<EmbedSpec> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with(char::is_whitespace) || holds_token(line) {
        return None;
    }

    if let Some(caps) = YOUTUBE.captures(line) {
        return Some(EmbedSpec::YouTube {
            video_id: caps[1].to_string(),
        });
    }
    if let Some(caps) = TWITTER.captures(line) {
        return Some(EmbedSpec::TwitterStatus {
            url: unescape(line),
            status_id: caps[1].to_string(),
        });
    }
    if let Some(caps) = SPOTIFY.captures(line) {
        let kind = SpotifyKind::parse(&caps[1])?;
        return Some(EmbedSpec::Spotify {
            kind,
            id: caps[2].to_string(),
        });
    }
    if let Some(caps) = DIRECT_VIDEO.captures(line) {
        return Some(EmbedSpec::DirectVideo {
            url: unescape(&caps[1]),
        });
    }
    None
}

/// Replace every embeddable line in `text` with its markup.
pub fn resolve_embeds(text: &str) -> String {
    resolve_embeds_with(text, |markup| markup.into_string())
}

/// Like [`resolve_embeds`], with `place` deciding what goes in the line's
/// stead.
pub(crate) fn resolve_embeds_with(text: &str, mut place: impl FnMut(Markup) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match classify_line(line) {
            Some(spec) => {
                tracing::trace!(kind = spec.kind(), "resolved embed");
                out.push_str(&place(spec.to_markup()));
            }
            None => out.push_str(line),
        }
    }
    out
}
