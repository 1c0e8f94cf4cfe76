use anyhow::Result;
use bodystyle_common::BodyRangeList;

/// Plain body on the first line, then one range per line.
pub fn text(plain: &str, ranges: Option<&BodyRangeList>) -> String {
    let mut out = plain.to_string();
    for range in ranges.into_iter().flatten() {
        out.push('\n');
        out.push_str(&range.to_string());
    }
    out
}

pub fn json(plain: &str, ranges: Option<&BodyRangeList>, pretty: bool) -> Result<String> {
    let value = serde_json::json!({ "body": plain, "ranges": ranges });
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodystyle_common::{BodyRange, Style};

    #[test]
    fn text_lists_ranges_after_body() {
        let ranges = BodyRangeList::new(vec![BodyRange::styled(0, 4, Style::Bold)]);
        assert_eq!(
            text("bold", Some(&ranges)),
            "bold\nBodyRange(start=0, length=4, style=BOLD)"
        );
        assert_eq!(text("plain", None), "plain");
    }

    #[test]
    fn json_reports_absent_ranges_as_null() {
        let out = json("plain", None, false).unwrap();
        assert_eq!(out, r#"{"body":"plain","ranges":null}"#);
    }

    #[test]
    fn json_includes_styles() {
        let ranges = BodyRangeList::new(vec![BodyRange::styled(0, 6, Style::Italic)]);
        let out = json("italic", Some(&ranges), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["ranges"]["ranges"][0]["style"], "italic");
        assert_eq!(value["ranges"]["ranges"][0]["length"], 6);
    }
}
