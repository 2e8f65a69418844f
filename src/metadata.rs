//! On-demand EXIF lookup for images opened in the lightbox.
//!
//! Image bytes come from an [`ImageSource`] keyed by the URL the rendered
//! markup points at, so the same lookup works for `![[file]]` embeds served
//! from the image endpoint and for plain site paths. [`DirImageSource`] maps
//! both onto a directory:
//!
//! | URL | File |
//! |---|---|
//! | `/api/images/My%20Photo.jpg` | `<root>/My Photo.jpg` |
//! | `/uploads/2024/dune.jpg` | `<root>/uploads/2024/dune.jpg` |
//!
//! Lookups never fail loudly. A missing file, an unsupported URL or an image
//! without EXIF all end as `None` with a debug trace.

use crate::exif::{ExifData, parse_exif};
use percent_encoding::percent_decode_str;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("unsupported image URL: {0}")]
    Unsupported(String),
}

/// Something that can produce the bytes behind an image URL.
pub trait ImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Serves images from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirImageSource {
    root: PathBuf,
    endpoint: String,
}

impl DirImageSource {
    /// `endpoint` is the route wiki image embeds are served under, such as
    /// `/api/images`. Files behind it are looked up directly under `root`.
    pub fn new(root: impl Into<PathBuf>, endpoint: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path an image URL maps to.
    pub fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let unsupported = || FetchError::Unsupported(url.to_string());
        let path = url.split(['?', '#']).next().unwrap_or_default();
        if path.is_empty() || path.contains("://") || path.starts_with("//") {
            return Err(unsupported());
        }

        let endpoint_prefix = format!("{}/", self.endpoint);
        if let Some(encoded) = path.strip_prefix(&endpoint_prefix) {
            let name = percent_decode_str(encoded)
                .decode_utf8()
                .map_err(|_| unsupported())?;
            let mut components = Path::new(name.as_ref()).components();
            return match (components.next(), components.next()) {
                (Some(Component::Normal(file)), None) if !name.contains(['/', '\\']) => {
                    Ok(self.root.join(file))
                }
                _ => Err(unsupported()),
            };
        }

        let decoded = percent_decode_str(path.trim_start_matches('/'))
            .decode_utf8()
            .map_err(|_| unsupported())?;
        let relative = Path::new(decoded.as_ref());
        if decoded.is_empty()
            || decoded.contains('\\')
            || !relative.components().all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(unsupported());
        }
        Ok(self.root.join(relative))
    }
}

impl ImageSource for DirImageSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(url)?;
        if !path.is_file() {
            return Err(FetchError::NotFound(url.to_string()));
        }
        Ok(fs::read(&path)?)
    }
}

/// Fetch an image and parse its EXIF. Every failure is `None`.
pub fn extract_exif(source: &dyn ImageSource, url: &str) -> Option<ExifData> {
    let bytes = match source.fetch(url) {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!(url, error = %err, "EXIF lookup failed");
            return None;
        }
    };
    let exif = parse_exif(&bytes);
    if exif.is_none() {
        debug!(url, bytes = bytes.len(), "no EXIF found");
    }
    exif
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ExifFixture, jpeg_with_exif};
    use tempfile::TempDir;

    fn fixture_jpeg() -> Vec<u8> {
        jpeg_with_exif(
            &ExifFixture {
                model: Some("X100V"),
                f_number: Some((28, 10)),
                ..ExifFixture::default()
            }
            .tiff(false),
        )
    }

    fn source(tmp: &TempDir) -> DirImageSource {
        DirImageSource::new(tmp.path(), "/api/images")
    }

    #[test]
    fn resolve_endpoint_decodes_name() {
        let tmp = TempDir::new().unwrap();
        let path = source(&tmp).resolve("/api/images/My%20Photo%20(1).jpg").unwrap();
        assert_eq!(path, tmp.path().join("My Photo (1).jpg"));
    }

    #[test]
    fn resolve_plain_path_and_query() {
        let tmp = TempDir::new().unwrap();
        let path = source(&tmp).resolve("/uploads/dune.jpg?w=800").unwrap();
        assert_eq!(path, tmp.path().join("uploads").join("dune.jpg"));
    }

    #[test]
    fn resolve_refuses_traversal() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp);
        for url in [
            "/api/images/..%2Fsecret.jpg",
            "/api/images/%2E%2E",
            "/../secret.jpg",
            "/uploads/%2e%2e/%2e%2e/etc/passwd",
            "/a\\..\\b.jpg",
        ] {
            assert!(
                matches!(src.resolve(url), Err(FetchError::Unsupported(_))),
                "{url} should be refused"
            );
        }
    }

    #[test]
    fn resolve_refuses_remote_urls() {
        let tmp = TempDir::new().unwrap();
        let src = source(&tmp);
        assert!(src.resolve("https://example.com/a.jpg").is_err());
        assert!(src.resolve("//cdn.example.com/a.jpg").is_err());
        assert!(src.resolve("").is_err());
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = source(&tmp).fetch("/api/images/nope.jpg").unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[test]
    fn extract_through_endpoint() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("my photo.jpg"), fixture_jpeg()).unwrap();
        let exif = extract_exif(&source(&tmp), "/api/images/my%20photo.jpg").unwrap();
        assert_eq!(exif.model.as_deref(), Some("X100V"));
        assert_eq!(exif.aperture_label().as_deref(), Some("f/2.8"));
    }

    #[test]
    fn extract_without_exif_is_none() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("plain.jpg"), [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
        assert!(extract_exif(&source(&tmp), "/plain.jpg").is_none());
    }

    #[test]
    fn extract_failure_is_none() {
        struct Failing;
        impl ImageSource for Failing {
            fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
                Err(FetchError::NotFound(url.to_string()))
            }
        }
        assert!(extract_exif(&Failing, "/a.jpg").is_none());
    }
}
