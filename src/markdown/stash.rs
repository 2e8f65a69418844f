//! Placeholders for markup that later rules must not touch.
//!
//! Each stage that generates markup (wiki anchors, embeds, images, link
//! anchors) swaps it for a token built from private-use characters and keeps
//! the markup here. The regex rules never match those characters, so nothing
//! downstream can rewrite inside a generated attribute. [`Stash::restore`]
//! puts the markup back once every rule has run.
//!
//! Private-use characters in the input are replaced before any stage runs, so
//! every token in the working text was issued by the stash.

use super::text::{strip_tags, unescape};
use regex::{Captures, Regex};
use std::sync::LazyLock;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").expect("token regex"));

/// Markup held back from the text rules for the duration of one render.
#[derive(Debug, Default)]
pub(crate) struct Stash {
    fragments: Vec<String>,
}

impl Stash {
    /// Keep `markup` and return the token that stands in for it.
    pub fn hold(&mut self, markup: String) -> String {
        self.fragments.push(markup);
        format!("{OPEN}{}{CLOSE}", self.fragments.len() - 1)
    }

    /// Replace every token with the markup it stands for.
    pub fn restore(&self, text: &str) -> String {
        if !holds_token(text) {
            return text.to_string();
        }
        TOKEN
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| self.fragments.get(i))
                    .map_or("", String::as_str)
                    .to_string()
            })
            .into_owned()
    }

    /// Plain text of an escaped capture that may carry tokens: markup is
    /// restored, its tags dropped and entities decoded. Used for values that
    /// end up in attributes.
    pub fn plain_text(&self, text: &str) -> String {
        unescape(&strip_tags(&self.restore(text)))
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}

/// True if `text` contains a stash token.
pub(crate) fn holds_token(text: &str) -> bool {
    text.contains([OPEN, CLOSE])
}

/// Replace the characters tokens are built from, so input can never forge one.
pub(crate) fn defuse(text: &str) -> String {
    if holds_token(text) {
        text.replace([OPEN, CLOSE], "\u{FFFD}")
    } else {
        text.to_string()
    }
}
