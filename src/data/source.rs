use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use encoding_rs::Encoding;
use log::{debug, warn};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Source – where the raw export lives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` are URLs; anything else is a local path.
    pub fn parse(raw: &str) -> Source {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }

    /// Stable identifier used for cache keys and error messages.
    pub fn id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the raw bytes of a source. A remote fetch is bounded by `timeout`
/// and not retried. An empty payload counts as unavailable.
pub fn fetch_bytes(source: &Source, timeout: Duration) -> Result<Vec<u8>, LoadError> {
    let bytes = match source {
        Source::Path(path) => {
            std::fs::read(path).map_err(|e| LoadError::unavailable(source.id(), e))?
        }
        Source::Url(url) => fetch_url(url, timeout).map_err(|e| LoadError::unavailable(source.id(), e))?,
    };
    if bytes.is_empty() {
        return Err(LoadError::unavailable(source.id(), "empty payload"));
    }
    debug!("fetched {} bytes from {source}", bytes.len());
    Ok(bytes)
}

fn fetch_url(url: &str, timeout: Duration) -> Result<Vec<u8>, reqwest::Error> {
    let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
    let resp = client.get(url).send()?.error_for_status()?;
    Ok(resp.bytes()?.to_vec())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode strictly with `encoding`, dropping that encoding's BOM if present.
/// Returns `None` when any byte sequence is malformed.
pub fn decode_strict<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        None
    } else {
        Some(text)
    }
}

/// Decode with the primary encoding, then once with the fallback.
/// Returns the text and the encoding that succeeded.
pub fn decode<'a>(
    source_id: &str,
    bytes: &'a [u8],
    primary: &'static Encoding,
    fallback: &'static Encoding,
) -> Result<(Cow<'a, str>, &'static Encoding), LoadError> {
    if let Some(text) = decode_strict(bytes, primary) {
        return Ok((text, primary));
    }
    warn!(
        "{source_id}: not valid {}, retrying as {}",
        primary.name(),
        fallback.name()
    );
    decode_strict(bytes, fallback)
        .map(|text| (text, fallback))
        .ok_or_else(|| {
            LoadError::unavailable(
                source_id,
                format!("could not decode as {} or {}", primary.name(), fallback.name()),
            )
        })
}
