//! Minimal EXIF reader for JPEG, TIFF and PNG.
//!
//! Extracts the fields the lightbox overlay shows:
//! - Make (0x010F) and Model (0x0110) from IFD0
//! - ExposureTime (0x829A), FNumber (0x829D), ISO (0x8827),
//!   DateTimeOriginal (0x9003), FocalLength (0x920A) and LensModel (0xA434)
//!   from the Exif sub-IFD (IFD0 tag 0x8769)
//!
//! Containers:
//! - JPEG: APP1 segment starting with `Exif\0\0`, followed by a TIFF header.
//! - TIFF: the file itself (`II*\0` or `MM\0*`).
//! - PNG: `eXIf` chunk, raw TIFF bytes.
//!
//! All offsets inside the TIFF structure are relative to the TIFF header.
//! Every read is bounds-checked; malformed input yields `None`, never a panic.

use serde::Serialize;
use std::fmt;

/// Unsigned rational as stored in EXIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub fn value(self) -> Option<f64> {
        (self.den != 0).then(|| f64::from(self.num) / f64::from(self.den))
    }
}

/// Camera settings for one photo. Every field is optional; a parse that finds
/// none of them returns `None` instead of an empty record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lens: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_number: Option<Rational>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<Rational>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<Rational>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
}

impl ExifData {
    fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.lens.is_none()
            && self.f_number.is_none()
            && self.exposure_time.is_none()
            && self.iso.is_none()
            && self.focal_length.is_none()
            && self.taken_at.is_none()
    }

    /// Camera name, without the make repeated when the model already has it
    /// (`Canon` + `Canon EOS R5` → `Canon EOS R5`).
    pub fn camera(&self) -> Option<String> {
        match (&self.make, &self.model) {
            (Some(make), Some(model)) if model.starts_with(make.as_str()) => Some(model.clone()),
            (Some(make), Some(model)) => Some(format!("{make} {model}")),
            (None, Some(model)) => Some(model.clone()),
            (Some(make), None) => Some(make.clone()),
            (None, None) => None,
        }
    }

    /// `f/2.8`
    pub fn aperture_label(&self) -> Option<String> {
        let f = self.f_number?.value()?;
        Some(format!("f/{}", trim_float(f, 1)))
    }

    /// `1/250s` for fast shutter speeds, `2s` or `0.5s` otherwise.
    pub fn exposure_label(&self) -> Option<String> {
        let exposure = self.exposure_time?;
        let seconds = exposure.value()?;
        if seconds <= 0.0 {
            return None;
        }
        if seconds < 1.0 {
            let denominator = (1.0 / seconds).round();
            if exposure.num == 1 || (1.0 / denominator - seconds).abs() < 1e-6 {
                return Some(format!("1/{denominator}s"));
            }
        }
        Some(format!("{}s", trim_float(seconds, 1)))
    }

    /// `ISO 400`
    pub fn iso_label(&self) -> Option<String> {
        self.iso.map(|iso| format!("ISO {iso}"))
    }

    /// `35mm`
    pub fn focal_length_label(&self) -> Option<String> {
        let mm = self.focal_length?.value()?;
        Some(format!("{}mm", trim_float(mm, 1)))
    }

    /// Label/value rows for the lightbox overlay, in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        let mut push = |label, value: Option<String>| {
            if let Some(v) = value {
                rows.push((label, v));
            }
        };
        push("Camera", self.camera());
        push("Lens", self.lens.clone());
        push("Aperture", self.aperture_label());
        push("Exposure", self.exposure_label());
        push("ISO", self.iso_label());
        push("Focal length", self.focal_length_label());
        push("Taken", self.taken_at.clone());
        rows
    }
}

impl fmt::Display for ExifData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.rows().into_iter().map(|(_, v)| v).collect();
        f.write_str(&parts.join(" · "))
    }
}

/// `2.0` → `2`, `2.8` → `2.8`.
fn trim_float(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Parse EXIF from image bytes, detecting the container by signature.
pub fn parse_exif(data: &[u8]) -> Option<ExifData> {
    let tiff = if data.starts_with(&[0xFF, 0xD8]) {
        find_jpeg_exif(data)?
    } else if data.starts_with(PNG_SIGNATURE) {
        find_png_exif(data)?
    } else if data.starts_with(b"II") || data.starts_with(b"MM") {
        data
    } else {
        return None;
    };
    parse_tiff(tiff)
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Find the TIFF bytes inside a JPEG's APP1 Exif segment.
fn find_jpeg_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // Start of scan: no metadata after this point
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xE1 {
            if let Some(tiff) = data.get(seg_start..seg_end)?.strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

/// Find the `eXIf` chunk payload in a PNG.
fn find_png_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(len)?;
        if kind == b"eXIf" {
            return data.get(body_start..body_end);
        }
        if kind == b"IDAT" || kind == b"IEND" {
            return None;
        }
        // body + CRC
        pos = body_end.checked_add(4)?;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF structure
// ---------------------------------------------------------------------------

const TAG_MAKE: u16 = 0x010F;
const TAG_MODEL: u16 = 0x0110;
const TAG_EXIF_IFD: u16 = 0x8769;
const TAG_EXPOSURE_TIME: u16 = 0x829A;
const TAG_F_NUMBER: u16 = 0x829D;
const TAG_ISO: u16 = 0x8827;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
const TAG_FOCAL_LENGTH: u16 = 0x920A;
const TAG_LENS_MODEL: u16 = 0xA434;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

/// Upper bound on entries read from one IFD; real files carry a few dozen.
const MAX_IFD_ENTRIES: usize = 512;

struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

struct IfdEntry {
    tag: u16,
    typ: u16,
    count: usize,
    /// Offset of the 4-byte value field inside the entry.
    field: usize,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let big_endian = match data.get(0..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let reader = Self { data, big_endian };
        (reader.u16(2)? == 42).then_some(reader)
    }

    fn u16(&self, offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = self.data.get(offset..offset + 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    }

    fn u32(&self, offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = self.data.get(offset..offset + 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    }

    fn entries(&self, ifd_offset: usize) -> Vec<IfdEntry> {
        let Some(count) = self.u16(ifd_offset) else {
            return Vec::new();
        };
        (0..usize::from(count).min(MAX_IFD_ENTRIES))
            .map_while(|i| {
                let at = ifd_offset + 2 + i * 12;
                Some(IfdEntry {
                    tag: self.u16(at)?,
                    typ: self.u16(at + 2)?,
                    count: self.u32(at + 4)? as usize,
                    field: at + 8,
                })
            })
            .collect()
    }

    /// Start of an entry's value: inline when it fits in four bytes.
    fn value_offset(&self, entry: &IfdEntry, unit: usize) -> Option<usize> {
        if entry.count.checked_mul(unit)? <= 4 {
            Some(entry.field)
        } else {
            self.u32(entry.field).map(|o| o as usize)
        }
    }

    fn ascii(&self, entry: &IfdEntry) -> Option<String> {
        if entry.typ != TYPE_ASCII {
            return None;
        }
        let start = self.value_offset(entry, 1)?;
        let bytes = self.data.get(start..start.checked_add(entry.count)?)?;
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end_matches('\0').trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    fn rational(&self, entry: &IfdEntry) -> Option<Rational> {
        if entry.typ != TYPE_RATIONAL || entry.count == 0 {
            return None;
        }
        let start = self.value_offset(entry, 8)?;
        Some(Rational {
            num: self.u32(start)?,
            den: self.u32(start + 4)?,
        })
    }

    fn integer(&self, entry: &IfdEntry) -> Option<u32> {
        if entry.count == 0 {
            return None;
        }
        match entry.typ {
            TYPE_SHORT => self.u16(self.value_offset(entry, 2)?).map(u32::from),
            TYPE_LONG => self.u32(self.value_offset(entry, 4)?),
            _ => None,
        }
    }
}

fn parse_tiff(data: &[u8]) -> Option<ExifData> {
    let reader = TiffReader::new(data)?;
    let ifd0 = reader.u32(4)? as usize;
    let mut exif = ExifData::default();
    let mut sub_ifd = None;

    for entry in reader.entries(ifd0) {
        match entry.tag {
            TAG_MAKE => exif.make = reader.ascii(&entry),
            TAG_MODEL => exif.model = reader.ascii(&entry),
            TAG_EXIF_IFD => sub_ifd = reader.integer(&entry).map(|o| o as usize),
            _ => {}
        }
    }

    // A sub-IFD pointing back at IFD0 would just re-read the same entries.
    if let Some(offset) = sub_ifd.filter(|&o| o != ifd0) {
        for entry in reader.entries(offset) {
            match entry.tag {
                TAG_EXPOSURE_TIME => exif.exposure_time = reader.rational(&entry),
                TAG_F_NUMBER => exif.f_number = reader.rational(&entry),
                TAG_ISO => exif.iso = reader.integer(&entry),
                TAG_DATE_TIME_ORIGINAL => exif.taken_at = reader.ascii(&entry),
                TAG_FOCAL_LENGTH => exif.focal_length = reader.rational(&entry),
                TAG_LENS_MODEL => exif.lens = reader.ascii(&entry),
                _ => {}
            }
        }
    }

    (!exif.is_empty()).then_some(exif)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ExifFixture, jpeg_with_exif, png_with_exif};

    fn sample() -> ExifFixture {
        ExifFixture {
            make: Some("FUJIFILM"),
            model: Some("X-T4"),
            lens: Some("XF35mmF1.4 R"),
            f_number: Some((28, 10)),
            exposure_time: Some((1, 250)),
            iso: Some(400),
            focal_length: Some((35, 1)),
            taken_at: Some("2024:05:01 18:32:10"),
        }
    }

    #[test]
    fn parse_empty_returns_none() {
        assert_eq!(parse_exif(&[]), None);
    }

    #[test]
    fn parse_garbage_returns_none() {
        assert_eq!(parse_exif(b"not an image at all"), None);
        assert_eq!(parse_exif(&[0xFF, 0xD8, 0xFF]), None);
        assert_eq!(parse_exif(b"II*\0\xff\xff\xff\xff"), None);
    }

    #[test]
    fn parse_little_endian_tiff() {
        let tiff = sample().tiff(false);
        let exif = parse_exif(&tiff).unwrap();
        assert_eq!(exif.make.as_deref(), Some("FUJIFILM"));
        assert_eq!(exif.model.as_deref(), Some("X-T4"));
        assert_eq!(exif.iso, Some(400));
        assert_eq!(exif.f_number, Some(Rational { num: 28, den: 10 }));
        assert_eq!(exif.lens.as_deref(), Some("XF35mmF1.4 R"));
        assert_eq!(exif.taken_at.as_deref(), Some("2024:05:01 18:32:10"));
    }

    #[test]
    fn parse_big_endian_tiff() {
        let tiff = sample().tiff(true);
        let exif = parse_exif(&tiff).unwrap();
        assert_eq!(exif.exposure_time, Some(Rational { num: 1, den: 250 }));
        assert_eq!(exif.focal_length, Some(Rational { num: 35, den: 1 }));
    }

    #[test]
    fn parse_from_jpeg_app1() {
        let jpeg = jpeg_with_exif(&sample().tiff(false));
        let exif = parse_exif(&jpeg).unwrap();
        assert_eq!(exif.camera().as_deref(), Some("FUJIFILM X-T4"));
    }

    #[test]
    fn parse_from_png_chunk() {
        let png = png_with_exif(&sample().tiff(true));
        let exif = parse_exif(&png).unwrap();
        assert_eq!(exif.iso, Some(400));
    }

    #[test]
    fn jpeg_without_exif_returns_none() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00, 0xFF, 0xDA, 0x00, 0x02];
        assert_eq!(parse_exif(&jpeg), None);
    }

    #[test]
    fn tiff_without_known_tags_returns_none() {
        let tiff = ExifFixture::default().tiff(false);
        assert_eq!(parse_exif(&tiff), None);
    }

    #[test]
    fn truncated_input_never_panics() {
        let jpeg = jpeg_with_exif(&sample().tiff(false));
        for len in 0..jpeg.len() {
            let _ = parse_exif(&jpeg[..len]);
        }
    }

    #[test]
    fn labels() {
        let exif = parse_exif(&sample().tiff(false)).unwrap();
        assert_eq!(exif.aperture_label().as_deref(), Some("f/2.8"));
        assert_eq!(exif.exposure_label().as_deref(), Some("1/250s"));
        assert_eq!(exif.iso_label().as_deref(), Some("ISO 400"));
        assert_eq!(exif.focal_length_label().as_deref(), Some("35mm"));
    }

    #[test]
    fn long_exposure_label() {
        let exif = ExifData {
            exposure_time: Some(Rational { num: 5, den: 2 }),
            ..ExifData::default()
        };
        assert_eq!(exif.exposure_label().as_deref(), Some("2.5s"));
    }

    #[test]
    fn exposure_as_reduced_fraction() {
        let exif = ExifData {
            exposure_time: Some(Rational { num: 10, den: 2500 }),
            ..ExifData::default()
        };
        assert_eq!(exif.exposure_label().as_deref(), Some("1/250s"));
    }

    #[test]
    fn zero_denominator_has_no_label() {
        let exif = ExifData {
            f_number: Some(Rational { num: 28, den: 0 }),
            ..ExifData::default()
        };
        assert_eq!(exif.aperture_label(), None);
    }

    #[test]
    fn camera_does_not_repeat_make() {
        let exif = ExifData {
            make: Some("Canon".to_string()),
            model: Some("Canon EOS R5".to_string()),
            ..ExifData::default()
        };
        assert_eq!(exif.camera().as_deref(), Some("Canon EOS R5"));
    }

    #[test]
    fn rows_skip_missing_fields() {
        let exif = ExifData {
            iso: Some(100),
            ..ExifData::default()
        };
        assert_eq!(exif.rows(), vec![("ISO", "ISO 100".to_string())]);
        assert_eq!(exif.to_string(), "ISO 100");
    }
}
