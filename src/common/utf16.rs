//! UTF-16 working representation for offset arithmetic.
//!
//! Signal addresses mention spans in UTF-16 code units, while Rust strings
//! are indexed by UTF-8 bytes. Every offset computation in this crate runs on
//! a [`Utf16Text`] buffer instead: text is expanded once on the way in, every
//! character outside the Basic Multilingual Plane occupies two addressable
//! units (its surrogate pair), and the buffer is collapsed once on the way
//! out. Collapsing is strict and reports the first unpaired surrogate.
//!
//! # Examples
//!
//! ```
//! use signal_formatter::common::utf16::{collapse, expand};
//!
//! let text = expand("👋 hi");
//! assert_eq!(text.len(), 5);
//! assert_eq!(collapse(&text.as_units()[2..]).unwrap(), " hi");
//! assert!(collapse(&text.as_units()[1..]).is_err());
//! ```
use crate::common::{Error, Result};
use std::fmt;
use std::ops::Range;

/// A sequence of UTF-16 code units addressed one unit at a time.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Utf16Text {
    units: Vec<u16>,
}

impl Utf16Text {
    /// Create an empty buffer.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` units.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            units: Vec::with_capacity(capacity),
        }
    }

    /// Wrap raw code units. The units are not validated until collapse.
    #[inline]
    pub fn from_units(units: Vec<u16>) -> Self {
        Self { units }
    }

    /// Length in code units.
    #[inline]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[inline]
    pub fn as_units(&self) -> &[u16] {
        &self.units
    }

    #[inline]
    pub fn into_units(self) -> Vec<u16> {
        self.units
    }

    /// Append the expansion of `s`.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.units.extend(s.encode_utf16());
    }

    #[inline]
    pub fn extend_from_units(&mut self, units: &[u16]) {
        self.units.extend_from_slice(units);
    }

    /// Append another buffer, consuming it.
    #[inline]
    pub fn append(&mut self, mut other: Utf16Text) {
        self.units.append(&mut other.units);
    }

    /// Shorten the buffer to `len` units. Longer lengths are a no-op.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.units.truncate(len);
    }

    /// Borrow a range of units, failing instead of panicking when the range
    /// does not lie inside the buffer.
    pub fn slice(&self, range: Range<usize>) -> Result<&[u16]> {
        self.units
            .get(range.clone())
            .ok_or(Error::OffsetOutOfBounds {
                start: range.start,
                length: range.end.saturating_sub(range.start),
                len: self.units.len(),
            })
    }

    /// Position of the first occurrence of `needle` at or after `from`.
    pub fn find(&self, needle: &[u16], from: usize) -> Option<usize> {
        let haystack = self.units.get(from..)?;
        if needle.is_empty() {
            return Some(from);
        }
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|pos| pos + from)
    }

    /// Whether the buffer holds exactly the expansion of `s`.
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        self.units.iter().copied().eq(s.encode_utf16())
    }

    /// Whether the buffer ends with the expansion of `s`.
    pub fn ends_with_str(&self, s: &str) -> bool {
        let suffix: Vec<u16> = s.encode_utf16().collect();
        self.units.ends_with(&suffix)
    }

    /// The range left after stripping leading and trailing whitespace.
    ///
    /// Whitespace characters all live in the BMP, so a surrogate always stops
    /// the scan in either direction.
    pub fn trim_bounds(&self) -> Range<usize> {
        let mut start = 0;
        for decoded in char::decode_utf16(self.units.iter().copied()) {
            match decoded {
                Ok(ch) if ch.is_whitespace() => start += ch.len_utf16(),
                _ => break,
            }
        }

        let mut end = self.units.len();
        for decoded in char::decode_utf16(self.units[start..].iter().rev().copied()) {
            match decoded {
                Ok(ch) if ch.is_whitespace() => end -= ch.len_utf16(),
                _ => break,
            }
        }
        start..end
    }

    /// Convert back into a `String`. See [`collapse`].
    #[inline]
    pub fn collapse(&self) -> Result<String> {
        collapse(&self.units)
    }

    /// Convert back into a `String`, replacing unpaired surrogates with
    /// U+FFFD. Only meant for diagnostics.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units)
    }
}

impl fmt::Debug for Utf16Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Utf16Text({:?})", self.to_string_lossy())
    }
}

impl From<&str> for Utf16Text {
    #[inline]
    fn from(text: &str) -> Self {
        expand(text)
    }
}

/// Expand `text` into UTF-16 code units.
#[inline]
pub fn expand(text: &str) -> Utf16Text {
    Utf16Text {
        units: text.encode_utf16().collect(),
    }
}

/// Recombine surrogate pairs into a `String`.
///
/// This is the exact inverse of [`expand`]. A high surrogate not followed by
/// a low surrogate, or a low surrogate on its own, fails with
/// [`Error::UnpairedSurrogate`] carrying the unit's offset.
pub fn collapse(units: &[u16]) -> Result<String> {
    let mut out = String::with_capacity(units.len());
    let mut index = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(ch) => {
                out.push(ch);
                index += ch.len_utf16();
            },
            Err(err) => {
                return Err(Error::UnpairedSurrogate {
                    index,
                    unit: err.unpaired_surrogate(),
                });
            },
        }
    }
    Ok(out)
}

/// Length of `text` in UTF-16 code units.
#[inline]
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
