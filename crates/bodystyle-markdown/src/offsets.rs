//! Compaction of the scanned body and range remapping.
//!
//! One buffer, one slot per UTF-16 unit of the marked-up body, seen through
//! two types. While scanning it is a [`RemovalMarks`]: a slot holds `1` for a
//! unit to strip and `0` for a unit to keep. [`RemovalMarks::compact`]
//! rewrites it in place into an [`OffsetTable`], where each slot holds the
//! number of removed units at or before that index.

use bodystyle_common::{BodyRange, BodyRangeList};
use tracing::trace;

/// Per-unit removal flags produced by the scanner.
#[derive(Debug, Clone)]
pub struct RemovalMarks(Vec<usize>);

impl RemovalMarks {
    pub fn new(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn remove(&mut self, index: usize) {
        self.0[index] = 1;
    }

    pub(crate) fn keep(&mut self, index: usize) {
        self.0[index] = 0;
    }

    pub fn is_removed(&self, index: usize) -> bool {
        self.0[index] != 0
    }

    pub fn removed_count(&self) -> usize {
        self.0.iter().sum()
    }

    /// Copy every kept character of `body` into a new string and turn the
    /// flags into running removal counts.
    ///
    /// `body` must be the string these marks were scanned from. Only ASCII
    /// units are ever flagged, so a flagged slot always starts a one-unit
    /// character and surrogate pairs are copied whole.
    pub fn compact(self, body: &str) -> (String, OffsetTable) {
        let mut slots = self.0;
        let mut plain = String::with_capacity(body.len());
        let mut removed = 0;
        let mut unit = 0;

        for ch in body.chars() {
            let width = ch.len_utf16();
            if slots[unit] == 0 {
                plain.push(ch);
            }
            for slot in &mut slots[unit..unit + width] {
                removed += *slot;
                *slot = removed;
            }
            unit += width;
        }

        (plain, OffsetTable(slots))
    }
}

/// Cumulative removal counts, indexed by marked-up body unit.
#[derive(Debug, Clone)]
pub struct OffsetTable(Vec<usize>);

impl OffsetTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Units removed at or before `index`.
    pub fn removed_through(&self, index: usize) -> usize {
        self.0[index]
    }

    /// Units removed strictly before `index`. `index` may equal `len()`.
    pub fn removed_before(&self, index: usize) -> usize {
        match index {
            0 => 0,
            i => self.0[i - 1],
        }
    }

    pub fn is_removed(&self, index: usize) -> bool {
        self.removed_through(index) > self.removed_before(index)
    }

    pub fn total_removed(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Move `range` from marked-up coordinates into stripped coordinates,
    /// keeping its style and payload.
    ///
    /// The new start is the number of kept units before the old start. When
    /// the old start sits on a run of removed units, that is the same as
    /// walking back to the first unit of the run and mapping from there, so
    /// an annotation that began on a vanished marker begins where the marker
    /// used to be. The new length counts only the kept units the range
    /// covered.
    ///
    /// Panics if `range.end()` is past the end of the table.
    pub fn remap(&self, range: &BodyRange) -> BodyRange {
        let before = self.removed_before(range.start);
        let inside = self.removed_before(range.end()) - before;
        let remapped = range.with_span(range.start - before, range.length - inside);
        trace!(
            from_start = range.start,
            from_length = range.length,
            to_start = remapped.start,
            to_length = remapped.length,
            "remapped range"
        );
        remapped
    }

    /// Remap every range, yielding `None` when there are none.
    pub fn remap_all<'a, I>(&self, ranges: I) -> Option<BodyRangeList>
    where
        I: IntoIterator<Item = &'a BodyRange>,
    {
        let remapped: Vec<BodyRange> = ranges.into_iter().map(|r| self.remap(r)).collect();
        BodyRangeList::into_option(remapped)
    }
}
