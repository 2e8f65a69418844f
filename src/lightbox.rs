//! Lightbox state for photo frames.
//!
//! ```text
//!            open                exif_loaded(t)
//! Closed ──────────► Opening(t) ───────────────► Open(t)
//!   ▲                   │                          │ ▲ toggle_exif
//!   │ clear(t)          │ close                    │ └─┘
//!   └──────────── Closing(t) ◄─────────────────────┘
//!                                 close
//! ```
//!
//! Every opening gets a fresh [`Ticket`]. Results and timers carry the ticket
//! they were issued for and are ignored once it is no longer current, which is
//! how a late EXIF result for image A is kept off image B.

use crate::exif::ExifData;
use maud::{Markup, html};

/// Generation number identifying one opening of the lightbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// The image a lightbox is showing.
#[derive(Debug, Clone, PartialEq)]
pub struct LightboxEntry {
    pub ticket: Ticket,
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LightboxState {
    #[default]
    Closed,
    /// Image shown, metadata not yet known.
    Opening(LightboxEntry),
    /// Metadata lookup finished. `exif` is `None` when the image had none.
    Open {
        entry: LightboxEntry,
        exif: Option<ExifData>,
        show_exif: bool,
    },
    /// Fading out; cleared once the close delay elapses.
    Closing(LightboxEntry),
}

impl LightboxState {
    pub fn entry(&self) -> Option<&LightboxEntry> {
        match self {
            Self::Closed => None,
            Self::Opening(entry) | Self::Closing(entry) | Self::Open { entry, .. } => Some(entry),
        }
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.entry().map(|entry| entry.ticket)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Opening or open, as opposed to fading out or gone.
    pub fn is_showing(&self) -> bool {
        matches!(self, Self::Opening(_) | Self::Open { .. })
    }

    pub fn exif(&self) -> Option<&ExifData> {
        match self {
            Self::Open { exif, .. } => exif.as_ref(),
            _ => None,
        }
    }

    pub fn shows_exif(&self) -> bool {
        matches!(self, Self::Open { show_exif: true, exif: Some(_), .. })
    }

    /// Show `src`, replacing whatever was shown before.
    pub fn open(&mut self, ticket: Ticket, src: impl Into<String>, alt: impl Into<String>) {
        *self = Self::Opening(LightboxEntry {
            ticket,
            src: src.into(),
            alt: alt.into(),
        });
    }

    /// Attach a metadata result. Returns `false` and changes nothing when the
    /// result is for an opening that is no longer current.
    pub fn exif_loaded(&mut self, ticket: Ticket, exif: Option<ExifData>) -> bool {
        match std::mem::take(self) {
            Self::Opening(entry) if entry.ticket == ticket => {
                *self = Self::Open {
                    entry,
                    exif,
                    show_exif: false,
                };
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    /// Flip the metadata overlay. Only possible once metadata is present.
    pub fn toggle_exif(&mut self) -> bool {
        match self {
            Self::Open {
                exif: Some(_),
                show_exif,
                ..
            } => {
                *show_exif = !*show_exif;
                true
            }
            _ => false,
        }
    }

    /// Start fading out. Returns the ticket the clear timer must carry, or
    /// `None` when nothing is showing.
    pub fn close(&mut self) -> Option<Ticket> {
        match std::mem::take(self) {
            Self::Opening(entry) | Self::Open { entry, .. } => {
                let ticket = entry.ticket;
                *self = Self::Closing(entry);
                Some(ticket)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Finish a close started with `ticket`. A stale timer is ignored.
    pub fn clear(&mut self, ticket: Ticket) -> bool {
        match self {
            Self::Closing(entry) if entry.ticket == ticket => {
                *self = Self::Closed;
                true
            }
            _ => false,
        }
    }

    /// Value of the backdrop's `data-state` attribute.
    pub fn data_state(&self) -> Option<&'static str> {
        match self {
            Self::Closed => None,
            Self::Opening(_) | Self::Open { .. } => Some("open"),
            Self::Closing(_) => Some("closing"),
        }
    }

    /// Overlay markup. Empty when closed.
    pub fn render(&self) -> Markup {
        let (Some(entry), Some(state)) = (self.entry(), self.data_state()) else {
            return html! {};
        };
        let has_exif = self.exif().is_some();
        html! {
            div class="lightbox-backdrop" data-state=(state) role="dialog" aria-modal="true" {
                button type="button" class="lightbox-close" aria-label="Close" { "×" }
                figure class="lightbox-figure" {
                    img class="lightbox-image" src=(entry.src) alt=(entry.alt)
                        data-has-exif[has_exif];
                    @if let (true, Some(exif)) = (self.shows_exif(), self.exif()) {
                        div class="lightbox-exif" {
                            table {
                                @for (label, value) in exif.rows() {
                                    tr { th { (label) } td { (value) } }
                                }
                            }
                        }
                    } @else if !entry.alt.is_empty() {
                        figcaption class="lightbox-caption" { (entry.alt) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exif() -> ExifData {
        ExifData {
            model: Some("X100V".into()),
            iso: Some(400),
            ..ExifData::default()
        }
    }

    fn opening(ticket: u64) -> LightboxState {
        let mut state = LightboxState::default();
        state.open(Ticket(ticket), "/a.jpg", "A");
        state
    }

    #[test]
    fn open_then_exif_reaches_open() {
        let mut state = opening(1);
        assert!(state.is_showing());
        assert!(state.exif_loaded(Ticket(1), Some(exif())));
        assert_eq!(state.exif().and_then(|e| e.iso), Some(400));
        assert!(!state.shows_exif());
    }

    #[test]
    fn stale_exif_is_dropped() {
        let mut state = opening(1);
        state.open(Ticket(2), "/b.jpg", "B");
        assert!(!state.exif_loaded(Ticket(1), Some(exif())));
        assert!(matches!(state, LightboxState::Opening(ref e) if e.src == "/b.jpg"));
    }

    #[test]
    fn exif_after_close_is_dropped() {
        let mut state = opening(1);
        state.close();
        assert!(!state.exif_loaded(Ticket(1), Some(exif())));
        assert!(matches!(state, LightboxState::Closing(_)));
    }

    #[test]
    fn missing_exif_still_opens() {
        let mut state = opening(1);
        assert!(state.exif_loaded(Ticket(1), None));
        assert!(matches!(state, LightboxState::Open { exif: None, .. }));
        assert!(!state.toggle_exif());
    }

    #[test]
    fn toggle_needs_metadata() {
        let mut state = opening(1);
        assert!(!state.toggle_exif());
        state.exif_loaded(Ticket(1), Some(exif()));
        assert!(state.toggle_exif());
        assert!(state.shows_exif());
        assert!(state.toggle_exif());
        assert!(!state.shows_exif());
    }

    #[test]
    fn close_and_clear() {
        let mut state = opening(3);
        assert_eq!(state.close(), Some(Ticket(3)));
        assert_eq!(state.close(), None);
        assert!(!state.clear(Ticket(2)));
        assert!(state.clear(Ticket(3)));
        assert!(state.is_closed());
    }

    #[test]
    fn clear_after_reopen_is_ignored() {
        let mut state = opening(1);
        state.close();
        state.open(Ticket(2), "/b.jpg", "");
        assert!(!state.clear(Ticket(1)));
        assert!(state.is_showing());
    }

    #[test]
    fn closed_renders_nothing() {
        assert_eq!(LightboxState::Closed.render().into_string(), "");
    }

    #[test]
    fn render_open_with_caption() {
        let html = opening(1).render().into_string();
        assert!(html.contains(r#"data-state="open""#));
        assert!(html.contains(r#"class="lightbox-image" src="/a.jpg" alt="A""#));
        assert!(html.contains(r#"<figcaption class="lightbox-caption">A</figcaption>"#));
        assert!(!html.contains("lightbox-exif"));
    }

    #[test]
    fn render_exif_table_replaces_caption() {
        let mut state = opening(1);
        state.exif_loaded(Ticket(1), Some(exif()));
        assert!(state.render().into_string().contains("data-has-exif"));
        state.toggle_exif();
        let html = state.render().into_string();
        assert!(html.contains("lightbox-exif"));
        assert!(html.contains("<td>X100V</td>"));
        assert!(html.contains("<td>ISO 400</td>"));
        assert!(!html.contains("figcaption"));
    }

    #[test]
    fn render_closing_state() {
        let mut state = opening(1);
        state.close();
        assert!(state.render().into_string().contains(r#"data-state="closing""#));
    }

    #[test]
    fn render_escapes_alt() {
        let mut state = LightboxState::default();
        state.open(Ticket(1), "/a.jpg", "<script>");
        let html = state.render().into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
