//! Turn a message body with inline markdown markers into plain text plus
//! style ranges.
//!
//! Recognised markers are `**`/`__` (bold), `*`/`_` (italic), `~~`
//! (strikethrough), `||` (spoiler) and `` ` `` (monospace). A backslash
//! escapes any of `` \ ` * _ ~ | ``. Markers that never close are left in the
//! text untouched.
//!
//! All offsets are UTF-16 code units.

pub mod offsets;
pub mod scanner;

use bodystyle_common::{BodyRangeList, Result};
use tracing::{debug, warn};

pub use offsets::{OffsetTable, RemovalMarks};
pub use scanner::{Scan, scan};

/// Strip markers from `body` and return the plain text with its ranges.
///
/// `ranges` are pre-existing ranges (mentions, earlier styles) expressed in
/// `body`'s coordinates. They come first in the result, followed by the
/// styles found in `body`, all in the plain text's coordinates. The result
/// is `None` when there are no ranges at all. The input list's
/// `unknown_fields` are carried over.
///
/// Every supplied range must end within `body`, measured in UTF-16 units;
/// this panics otherwise. Use [`try_process`] for ranges that have not been
/// checked.
pub fn process(body: &str, ranges: Option<&BodyRangeList>) -> (String, Option<BodyRangeList>) {
    let units: Vec<u16> = body.encode_utf16().collect();
    let Scan {
        marks,
        ranges: discovered,
    } = scan(&units);
    let (plain, table) = marks.compact(body);

    debug!(
        units = units.len(),
        removed = table.total_removed(),
        discovered = discovered.len(),
        "stripped markdown markers"
    );

    let supplied = ranges.into_iter().flat_map(|list| list.iter());
    let remapped = table.remap_all(supplied.chain(discovered.iter()));
    let remapped = match (remapped, ranges) {
        (Some(mut list), Some(input)) => {
            list.unknown_fields = input.unknown_fields.clone();
            Some(list)
        }
        (remapped, _) => remapped,
    };

    (plain, remapped)
}

/// Like [`process`], but rejects supplied ranges that do not fit `body`.
pub fn try_process(
    body: &str,
    ranges: Option<&BodyRangeList>,
) -> Result<(String, Option<BodyRangeList>)> {
    if let Some(list) = ranges {
        let body_len = body.encode_utf16().count();
        if let Err(e) = list.validate(body_len) {
            warn!(body_len, error = %e, "rejecting supplied body ranges");
            return Err(e);
        }
    }
    Ok(process(body, ranges))
}
