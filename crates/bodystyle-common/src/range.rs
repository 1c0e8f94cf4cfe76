use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Inline style carried by a [`BodyRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    None,
    Bold,
    Italic,
    Spoiler,
    Strikethrough,
    Monospace,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::None => "NONE",
            Style::Bold => "BOLD",
            Style::Italic => "ITALIC",
            Style::Spoiler => "SPOILER",
            Style::Strikethrough => "STRIKETHROUGH",
            Style::Monospace => "MONOSPACE",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A span of a message body, in UTF-16 code units, with an optional style
/// and an opaque annotation payload.
///
/// The mention identifier and unknown fields are never inspected here; they
/// travel with the range through every offset adjustment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyRange {
    pub start: usize,
    pub length: usize,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_opt"
    )]
    pub mention_aci: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "base64_bytes")]
    pub unknown_fields: Vec<u8>,
}

impl BodyRange {
    pub fn styled(start: usize, length: usize, style: Style) -> Self {
        Self {
            start,
            length,
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn mention(start: usize, length: usize, aci: impl Into<Vec<u8>>) -> Self {
        Self {
            start,
            length,
            mention_aci: Some(aci.into()),
            ..Self::default()
        }
    }

    /// One past the last unit covered by this range.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Same payload, new span.
    pub fn with_span(&self, start: usize, length: usize) -> Self {
        Self {
            start,
            length,
            ..self.clone()
        }
    }
}

impl fmt::Display for BodyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BodyRange(start={}, length={}, style=", self.start, self.length)?;
        match self.style {
            Some(style) => write!(f, "{style})"),
            None => f.write_str("null)"),
        }
    }
}

/// An unordered collection of body ranges.
///
/// Equality and hashing treat `ranges` as a multiset: two lists holding the
/// same ranges in a different order are equal. `unknown_fields` is passed
/// through and not compared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyRangeList {
    #[serde(default)]
    pub ranges: Vec<BodyRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", with = "base64_bytes")]
    pub unknown_fields: Vec<u8>,
}

impl BodyRangeList {
    pub fn new(ranges: Vec<BodyRange>) -> Self {
        Self {
            ranges,
            unknown_fields: Vec::new(),
        }
    }

    /// Wrap `ranges`, mapping an empty list to `None`.
    pub fn into_option(ranges: Vec<BodyRange>) -> Option<Self> {
        if ranges.is_empty() {
            None
        } else {
            Some(Self::new(ranges))
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BodyRange> {
        self.ranges.iter()
    }

    /// Check that every range fits inside a body of `body_len` units.
    pub fn validate(&self, body_len: usize) -> Result<()> {
        for range in &self.ranges {
            let fits = range
                .start
                .checked_add(range.length)
                .is_some_and(|end| end <= body_len);
            if !fits {
                return Err(Error::RangeOutOfBounds {
                    start: range.start,
                    length: range.length,
                    body_len,
                });
            }
        }
        Ok(())
    }

    fn counts(&self) -> HashMap<&BodyRange, usize> {
        let mut counts = HashMap::with_capacity(self.ranges.len());
        for range in &self.ranges {
            *counts.entry(range).or_insert(0) += 1;
        }
        counts
    }
}

impl PartialEq for BodyRangeList {
    fn eq(&self, other: &Self) -> bool {
        self.ranges.len() == other.ranges.len() && self.counts() == other.counts()
    }
}

impl Eq for BodyRangeList {}

impl Hash for BodyRangeList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent: combine per-range hashes commutatively.
        let combined = self.ranges.iter().fold(0u64, |acc, range| {
            let mut hasher = DefaultHasher::new();
            range.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.ranges.len().hash(state);
        combined.hash(state);
    }
}

impl fmt::Display for BodyRangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyRangeList(ranges=[")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        f.write_str("])")
    }
}

impl FromIterator<BodyRange> for BodyRangeList {
    fn from_iter<I: IntoIterator<Item = BodyRange>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for BodyRangeList {
    type Item = BodyRange;
    type IntoIter = std::vec::IntoIter<BodyRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

impl<'a> IntoIterator for &'a BodyRangeList {
    type Item = &'a BodyRange;
    type IntoIter = std::slice::Iter<'a, BodyRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(serde::de::Error::custom)
    }
}

mod base64_opt {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => serializer.serialize_some(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|encoded| BASE64.decode(encoded).map_err(serde::de::Error::custom))
            .transpose()
    }
}
