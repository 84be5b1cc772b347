/*!
 * Inline String Optimization
 * Zero-allocation strings for process names and error messages
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smartstring::alias::String as SmartString;
use std::fmt;

/// Inline-optimized string that stores short strings (≤23 bytes) without heap allocation
///
/// # Performance
///
/// - **Small strings** (≤23 bytes): Stored inline, zero allocation
/// - **Large strings** (>23 bytes): Heap allocated like regular String
/// - Every process name fits inline (names are capped at 15 bytes)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct InlineString {
    inner: SmartString,
}

impl InlineString {
    /// Create new empty inline string
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmartString::new(),
        }
    }

    /// Copy at most `max_bytes` bytes of `s`, never splitting a character.
    ///
    /// Mirrors a bounded kernel string copy: the result is always a prefix of `s`.
    pub fn truncated(s: &str, max_bytes: usize) -> Self {
        let mut end = s.len().min(max_bytes);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        Self::from(&s[..end])
    }

    /// Get string slice
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// Check if string is stored inline (no heap allocation)
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.inner.is_inline()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear string (keeps allocation if heap-allocated)
    #[inline]
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

impl From<&str> for InlineString {
    #[inline]
    fn from(s: &str) -> Self {
        Self {
            inner: SmartString::from(s),
        }
    }
}

impl From<String> for InlineString {
    #[inline]
    fn from(s: String) -> Self {
        Self {
            inner: SmartString::from(s),
        }
    }
}

impl From<InlineString> for String {
    #[inline]
    fn from(s: InlineString) -> Self {
        s.inner.into()
    }
}

impl AsRef<str> for InlineString {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::ops::Deref for InlineString {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl fmt::Display for InlineString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InlineString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InlineString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_storage() {
        let short = InlineString::from("initcode");
        assert!(short.is_inline(), "Short strings should be inline");
        assert_eq!(short.as_str(), "initcode");
    }

    #[test]
    fn test_long_string_heap_allocated() {
        let long = InlineString::from(
            "This is a very long error message that definitely exceeds the inline threshold",
        );
        assert!(!long.is_inline(), "Long strings should use heap");
        assert!(long.as_str().contains("very long error"));
    }

    #[test]
    fn test_truncated_respects_limit() {
        let name = InlineString::truncated("background-worker-7", 15);
        assert_eq!(name.as_str(), "background-work");

        let short = InlineString::truncated("init", 15);
        assert_eq!(short.as_str(), "init");
    }

    #[test]
    fn test_truncated_never_splits_characters() {
        // "é" is two bytes; a 2-byte cap must not cut it in half
        let name = InlineString::truncated("aé", 2);
        assert_eq!(name.as_str(), "a");
    }

    #[test]
    fn test_serialization() {
        let inline_str = InlineString::from("test message");
        let json = serde_json::to_string(&inline_str).unwrap();
        assert_eq!(json, "\"test message\"");
        let deserialized: InlineString = serde_json::from_str(&json).unwrap();
        assert_eq!(inline_str, deserialized);
    }
}
