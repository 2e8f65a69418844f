//! Click handling for rendered content.
//!
//! The host forwards clicks inside the rendered container as a [`ClickEvent`]
//! (the element path from the click target up to the container) and performs
//! whatever [`Effect`]s come back. No I/O or timers run here: metadata
//! fetches and the close delay are requested as effects and reported back
//! with the [`Ticket`] they were issued for.
//!
//! ```text
//! host                          RenderView
//!  │ handle_click(path) ───────────►│ classify → update lightbox
//!  │◄─────── ClickOutcome ──────────│ { prevent_default, effects }
//!  │ perform FetchExif(t)           │
//!  │ exif_loaded(t, data) ─────────►│ applied only if t is current
//!  │ after delay: clear_elapsed(t) ►│ Closing(t) → Closed
//! ```

use crate::config::RendererConfig;
use crate::exif::ExifData;
use crate::lightbox::{LightboxState, Ticket};
use crate::markdown::{self, RenderOptions, RenderedDocument};
use maud::Markup;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_CLOSE_DELAY: Duration = Duration::from_millis(300);

/// One element on a click path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes
            .extend(class.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A click, as the path from the target element outwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    path: Vec<Element>,
}

impl ClickEvent {
    pub fn new(path: Vec<Element>) -> Self {
        Self { path }
    }

    pub fn target(&self) -> Option<&Element> {
        self.path.first()
    }

    pub fn path(&self) -> &[Element] {
        &self.path
    }
}

/// What a click landed on, nearest handler first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget<'a> {
    /// `a.wiki-link`; the slug is missing when the attribute is absent or empty.
    WikiLink { slug: Option<&'a str> },
    PhotoFrame { src: &'a str, alt: &'a str },
    LightboxImage,
    /// Inside the overlay but not on anything that reacts.
    LightboxPanel,
    LightboxDismiss,
    None,
}

/// Classify a click. Photo frames only react when frames are enabled.
pub fn classify_click(event: &ClickEvent, frames_enabled: bool) -> ClickTarget<'_> {
    for element in event.path() {
        if element.tag() == "a" && element.has_class("wiki-link") {
            let slug = element.attr("data-wiki-slug").filter(|s| !s.is_empty());
            return ClickTarget::WikiLink { slug };
        }
        if frames_enabled && element.has_class("photo-frame") {
            if let Some(src) = element.attr("data-img-src").filter(|s| !s.is_empty()) {
                let alt = element.attr("data-img-alt").unwrap_or_default();
                return ClickTarget::PhotoFrame { src, alt };
            }
        }
        if element.has_class("lightbox-image") {
            return ClickTarget::LightboxImage;
        }
        if element.has_class("lightbox-exif") || element.has_class("lightbox-caption") {
            return ClickTarget::LightboxPanel;
        }
        if element.has_class("lightbox-close") || element.has_class("lightbox-backdrop") {
            return ClickTarget::LightboxDismiss;
        }
    }
    ClickTarget::None
}

/// Work the host performs on the view's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Client-side navigation to a route.
    Navigate(String),
    /// Fetch and parse metadata for `src`, then call
    /// [`RenderView::exif_loaded`] with `ticket`.
    FetchExif { ticket: Ticket, src: String },
    /// Call [`RenderView::clear_elapsed`] with `ticket` after `after`.
    ScheduleClear { ticket: Ticket, after: Duration },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub prevent_default: bool,
    pub effects: Vec<Effect>,
}

impl ClickOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(effects: Vec<Effect>) -> Self {
        Self {
            prevent_default: true,
            effects,
        }
    }
}

/// A rendered piece of content and the interaction state around it.
#[derive(Debug)]
pub struct RenderView {
    document: RenderedDocument,
    options: RenderOptions,
    close_delay: Duration,
    lightbox: LightboxState,
    next_ticket: u64,
}

impl RenderView {
    pub fn new(content: &str, options: RenderOptions) -> Self {
        Self {
            document: markdown::render(content, &options),
            options,
            close_delay: DEFAULT_CLOSE_DELAY,
            lightbox: LightboxState::Closed,
            next_ticket: 1,
        }
    }

    pub fn from_config(content: &str, config: &RendererConfig, enable_frames: bool) -> Self {
        Self::new(content, config.render_options(enable_frames))
            .with_close_delay(config.lightbox.close_delay())
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn document(&self) -> &RenderedDocument {
        &self.document
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn lightbox(&self) -> &LightboxState {
        &self.lightbox
    }

    /// Replace the content. Any open lightbox is dropped with it, and pending
    /// results for it become stale.
    pub fn set_content(&mut self, content: &str) {
        self.document = markdown::render(content, &self.options);
        self.lightbox = LightboxState::Closed;
    }

    pub fn render_lightbox(&self) -> Markup {
        self.lightbox.render()
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    pub fn handle_click(&mut self, event: &ClickEvent) -> ClickOutcome {
        match classify_click(event, self.options.enable_frames) {
            ClickTarget::WikiLink { slug: Some(slug) } => {
                let route = format!("{}/{}", self.options.wiki_route.trim_end_matches('/'), slug);
                ClickOutcome::handled(vec![Effect::Navigate(route)])
            }
            ClickTarget::WikiLink { slug: None } => ClickOutcome::handled(Vec::new()),
            ClickTarget::PhotoFrame { src, alt } => {
                let (src, alt) = (src.to_string(), alt.to_string());
                let ticket = self.issue_ticket();
                self.lightbox.open(ticket, src.clone(), alt);
                ClickOutcome::handled(vec![Effect::FetchExif { ticket, src }])
            }
            ClickTarget::LightboxImage => {
                self.lightbox.toggle_exif();
                ClickOutcome::handled(Vec::new())
            }
            ClickTarget::LightboxPanel => ClickOutcome::handled(Vec::new()),
            ClickTarget::LightboxDismiss => match self.lightbox.close() {
                Some(ticket) => ClickOutcome::handled(vec![Effect::ScheduleClear {
                    ticket,
                    after: self.close_delay,
                }]),
                None => ClickOutcome::ignored(),
            },
            ClickTarget::None => ClickOutcome::ignored(),
        }
    }

    /// Report the result of a [`Effect::FetchExif`]. Returns whether it was
    /// applied.
    pub fn exif_loaded(&mut self, ticket: Ticket, exif: Option<ExifData>) -> bool {
        let applied = self.lightbox.exif_loaded(ticket, exif);
        if !applied {
            debug!(ticket = ticket.0, "dropping stale EXIF result");
        }
        applied
    }

    /// Report that a [`Effect::ScheduleClear`] delay has elapsed.
    pub fn clear_elapsed(&mut self, ticket: Ticket) -> bool {
        self.lightbox.clear(ticket)
    }
}
