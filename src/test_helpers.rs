//! Shared test utilities.
//!
//! Builds small but structurally valid image files carrying EXIF so the parser
//! and the metadata extractor can be tested without binary fixtures, and wraps
//! the click paths the interaction layer expects.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tiff = ExifFixture { iso: Some(400), ..ExifFixture::default() }.tiff(false);
//! let jpeg = jpeg_with_exif(&tiff);
//! assert_eq!(crate::exif::parse_exif(&jpeg).unwrap().iso, Some(400));
//! ```

use crate::interaction::{ClickEvent, Element};

// =========================================================================
// EXIF image fixtures
// =========================================================================

/// EXIF fields to write into a fixture. `None` fields are left out entirely.
#[derive(Debug, Clone, Default)]
pub struct ExifFixture {
    pub make: Option<&'static str>,
    pub model: Option<&'static str>,
    pub lens: Option<&'static str>,
    pub f_number: Option<(u32, u32)>,
    pub exposure_time: Option<(u32, u32)>,
    pub iso: Option<u32>,
    pub focal_length: Option<(u32, u32)>,
    pub taken_at: Option<&'static str>,
}

struct Entry {
    tag: u16,
    typ: u16,
    count: u32,
    payload: Vec<u8>,
}

struct Endian(bool);

impl Endian {
    fn u16(&self, v: u16) -> [u8; 2] {
        if self.0 { v.to_be_bytes() } else { v.to_le_bytes() }
    }

    fn u32(&self, v: u32) -> [u8; 4] {
        if self.0 { v.to_be_bytes() } else { v.to_le_bytes() }
    }

    fn ascii(&self, tag: u16, s: &str) -> Entry {
        let mut payload = s.as_bytes().to_vec();
        payload.push(0);
        Entry { tag, typ: 2, count: payload.len() as u32, payload }
    }

    fn rational(&self, tag: u16, (num, den): (u32, u32)) -> Entry {
        let mut payload = self.u32(num).to_vec();
        payload.extend_from_slice(&self.u32(den));
        Entry { tag, typ: 5, count: 1, payload }
    }

    fn short(&self, tag: u16, v: u16) -> Entry {
        Entry { tag, typ: 3, count: 1, payload: self.u16(v).to_vec() }
    }

    fn long(&self, tag: u16, v: u32) -> Entry {
        Entry { tag, typ: 4, count: 1, payload: self.u32(v).to_vec() }
    }
}

fn ifd_size(entries: usize) -> u32 {
    (2 + entries * 12 + 4) as u32
}

impl ExifFixture {
    /// Serialize as a bare TIFF structure (what JPEG APP1 and PNG eXIf carry).
    pub fn tiff(&self, big_endian: bool) -> Vec<u8> {
        let e = Endian(big_endian);

        let mut sub = Vec::new();
        if let Some(v) = self.exposure_time {
            sub.push(e.rational(0x829A, v));
        }
        if let Some(v) = self.f_number {
            sub.push(e.rational(0x829D, v));
        }
        if let Some(v) = self.iso {
            sub.push(e.short(0x8827, v as u16));
        }
        if let Some(v) = self.taken_at {
            sub.push(e.ascii(0x9003, v));
        }
        if let Some(v) = self.focal_length {
            sub.push(e.rational(0x920A, v));
        }
        if let Some(v) = self.lens {
            sub.push(e.ascii(0xA434, v));
        }

        let mut ifd0 = Vec::new();
        if let Some(v) = self.make {
            ifd0.push(e.ascii(0x010F, v));
        }
        if let Some(v) = self.model {
            ifd0.push(e.ascii(0x0110, v));
        }
        let has_sub = !sub.is_empty();
        if has_sub {
            // Placeholder, patched once the sub-IFD offset is known.
            ifd0.push(e.long(0x8769, 0));
        }

        let ifd0_offset = 8u32;
        let sub_offset = ifd0_offset + ifd_size(ifd0.len());
        let data_start = sub_offset + if has_sub { ifd_size(sub.len()) } else { 0 };
        if let Some(pointer) = ifd0.iter_mut().find(|entry| entry.tag == 0x8769) {
            pointer.payload = e.u32(sub_offset).to_vec();
        }

        let mut out = Vec::new();
        out.extend_from_slice(if big_endian { b"MM" } else { b"II" });
        out.extend_from_slice(&e.u16(42));
        out.extend_from_slice(&e.u32(ifd0_offset));

        // Values longer than four bytes live after both IFDs.
        let mut data_area = Vec::new();
        let mut write_ifd = |out: &mut Vec<u8>, entries: &[Entry]| {
            out.extend_from_slice(&e.u16(entries.len() as u16));
            for entry in entries {
                out.extend_from_slice(&e.u16(entry.tag));
                out.extend_from_slice(&e.u16(entry.typ));
                out.extend_from_slice(&e.u32(entry.count));
                if entry.payload.len() <= 4 {
                    let mut field = entry.payload.clone();
                    field.resize(4, 0);
                    out.extend_from_slice(&field);
                } else {
                    out.extend_from_slice(&e.u32(data_start + data_area.len() as u32));
                    data_area.extend_from_slice(&entry.payload);
                    if entry.payload.len() % 2 == 1 {
                        data_area.push(0);
                    }
                }
            }
            out.extend_from_slice(&e.u32(0));
        };
        write_ifd(&mut out, &ifd0);
        if has_sub {
            write_ifd(&mut out, &sub);
        }
        out.extend_from_slice(&data_area);
        out
    }
}

/// Wrap TIFF bytes in a minimal JPEG: SOI, APP1 Exif, SOS, EOI.
pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0xFF, 0xD9]);
    out
}

/// Wrap TIFF bytes in a minimal PNG: signature, IHDR, eXIf, IEND.
/// CRCs are zeroed; the parser does not check them.
pub fn png_with_exif(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let mut chunk = |kind: &[u8], body: &[u8]| {
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(body);
        out.extend_from_slice(&[0, 0, 0, 0]);
    };
    chunk(b"IHDR", &[0; 13]);
    chunk(b"eXIf", tiff);
    chunk(b"IEND", &[]);
    out
}

// =========================================================================
// Click paths
// =========================================================================

/// A click on a wiki link anchor.
pub fn wiki_click(slug: &str) -> ClickEvent {
    ClickEvent::new(vec![
        Element::new("a")
            .with_class("wiki-link")
            .with_attr("data-wiki-slug", slug),
    ])
}

/// A click on the image inside a photo frame; the figure is the parent.
pub fn frame_click(src: &str, alt: &str) -> ClickEvent {
    ClickEvent::new(vec![
        Element::new("img").with_attr("src", src),
        Element::new("div").with_class("photo-frame-inner"),
        Element::new("figure")
            .with_class("photo-frame")
            .with_attr("data-img-src", src)
            .with_attr("data-img-alt", alt),
    ])
}

/// A click on an element carrying a single class, such as `lightbox-image`.
pub fn class_click(tag: &str, class: &str) -> ClickEvent {
    ClickEvent::new(vec![Element::new(tag).with_class(class)])
}
