//! Image sources: `data:` URLs, `file://` URLs, and filesystem paths.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

use base64::Engine;
use slidecast_common::{SlidecastError, SlidecastResult};
use tiny_skia::{ColorU8, IntSize, Pixmap};

/// Fetch the raw bytes behind an image reference.
pub fn read_source(src: &str) -> SlidecastResult<Vec<u8>> {
    let src = src.trim();
    if let Some(rest) = src.strip_prefix("data:") {
        return decode_data_url(rest);
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(SlidecastError::decode(format!(
            "remote image sources are not fetched: {src}"
        )));
    }

    let path = src.strip_prefix("file://").unwrap_or(src);
    if !Path::new(path).exists() {
        return Err(SlidecastError::FileNotFound { path: path.into() });
    }
    Ok(std::fs::read(path)?)
}

fn decode_data_url(rest: &str) -> SlidecastResult<Vec<u8>> {
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| SlidecastError::decode("data URL has no payload"))?;

    if meta.ends_with(";base64") {
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| SlidecastError::decode(format!("invalid base64 in data URL: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(s: &str) -> SlidecastResult<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s
                .get(i + 1..i + 3)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| SlidecastError::decode("bad percent escape in data URL"))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Decode encoded image bytes into a premultiplied pixmap.
pub fn decode_pixmap(bytes: &[u8]) -> SlidecastResult<Pixmap> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|e| SlidecastError::decode(format!("image decode failed: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| SlidecastError::decode("image has no pixels"))?;

    let data = rgba
        .pixels()
        .flat_map(|p| {
            let c = ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Pixmap::from_vec(data, size).ok_or_else(|| SlidecastError::decode("image size mismatch"))
}

/// Read and decode an image reference.
pub fn load_image(src: &str) -> SlidecastResult<Pixmap> {
    decode_pixmap(&read_source(src)?)
}

/// Decoded images kept by an [`ImageCache`] unless configured otherwise.
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 64;

/// Decoded images keyed by source. Failures are cached as `None`, so each
/// bad source is decoded and reported once. Holds at most `capacity`
/// entries; the least recently used one is evicted first.
#[derive(Debug)]
pub struct ImageCache {
    capacity: usize,
    inner: Mutex<CacheEntries>,
}

#[derive(Debug, Default)]
struct CacheEntries {
    map: HashMap<String, Option<Arc<Pixmap>>>,
    /// Keys from least to most recently used.
    order: VecDeque<String>,
}

impl CacheEntries {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_IMAGE_CACHE_CAPACITY)
    }
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(CacheEntries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The decoded image for `src`, or `None` when it cannot be decoded.
    pub fn get(&self, src: &str) -> Option<Arc<Pixmap>> {
        let mut inner = self.lock();
        if let Some(hit) = inner.map.get(src).cloned() {
            inner.touch(src);
            return hit;
        }

        let loaded = match load_image(src) {
            Ok(pixmap) => Some(Arc::new(pixmap)),
            Err(err) => {
                tracing::warn!(error = %err, source = %abbreviate(src), "Skipping undecodable image");
                None
            }
        };
        while inner.map.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
            tracing::trace!(source = %abbreviate(&oldest), "Evicted cached image");
        }
        inner.map.insert(src.to_string(), loaded.clone());
        inner.order.push_back(src.to_string());
        loaded
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheEntries> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Data URLs are long; keep log lines readable.
fn abbreviate(src: &str) -> String {
    const MAX: usize = 64;
    match src.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &src[..cut]),
        None => src.to_string(),
    }
}
