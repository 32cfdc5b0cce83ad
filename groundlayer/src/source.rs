//! Tile source definition.
//!
//! A [`TileSource`] wraps a URL template such as
//! `https://tile.openstreetmap.org/{z}/{x}/{y}.png` and expands it into
//! per-tile request URLs. The template also identifies the source for
//! caching purposes: two loaders pointed at the same template share a cache
//! namespace, and changing the template moves the cache elsewhere.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::coord::TileCoord;

/// A slippy-map tile endpoint described by a URL template.
///
/// The tokens `{x}`, `{y}` and `{z}` are replaced with the tile coordinate;
/// matching is case-insensitive, so `{X}` works as well. Anything that is
/// not exactly a braced single token passes through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSource {
    template: String,
}

impl TileSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The template this source was built from, verbatim.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Expands the template into the request URL for one tile.
    pub fn tile_url(&self, coord: TileCoord) -> String {
        let url = substitute(&self.template, b'x', &coord.x.to_string());
        let url = substitute(&url, b'y', &coord.y.to_string());
        substitute(&url, b'z', &coord.z.to_string())
    }

    /// Stable identifier for this source, used to namespace its cache
    /// directory. Derived from the template text, so any change to the
    /// template yields a fresh namespace.
    pub fn namespace_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.template.hash(&mut hasher);
        hasher.finish()
    }
}

/// Replaces every `{<letter>}` token in `template` with `value`, ignoring
/// the letter's case. Runs a single left-to-right scan; replaced text is
/// never rescanned.
fn substitute(template: &str, letter: u8, value: &str) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + value.len());
    let mut i = 0;
    while i < template.len() {
        if bytes[i] == b'{'
            && i + 2 < template.len()
            && bytes[i + 1].eq_ignore_ascii_case(&letter)
            && bytes[i + 2] == b'}'
        {
            out.push_str(value);
            i += 3;
            continue;
        }
        // Step over one whole character to stay on UTF-8 boundaries.
        let step = template[i..].chars().next().map_or(1, char::len_utf8);
        out.push_str(&template[i..i + step]);
        i += step;
    }
    out
}
