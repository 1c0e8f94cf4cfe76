//! Single-pass marker scanner.
//!
//! Walks the body once, left to right, over UTF-16 code units. Every marker
//! that is successfully closed is flagged in a [`RemovalMarks`] buffer and
//! produces a [`BodyRange`] in the marked-up body's coordinates. Markers
//! that never close are left unflagged and stay in the text.

use bodystyle_common::{BodyRange, Style};
use tracing::trace;

use crate::offsets::RemovalMarks;

const BACKSLASH: u16 = b'\\' as u16;
const BACKTICK: u16 = b'`' as u16;
const STAR: u16 = b'*' as u16;
const UNDERSCORE: u16 = b'_' as u16;
const TILDE: u16 = b'~' as u16;
const PIPE: u16 = b'|' as u16;

/// Units a backslash can escape.
fn is_escapable(unit: u16) -> bool {
    matches!(unit, BACKSLASH | BACKTICK | STAR | UNDERSCORE | TILDE | PIPE)
}

/// Marker spellings other than the monospace backtick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    DoubleStar,
    DoubleUnderscore,
    DoubleTilde,
    DoublePipe,
    Star,
    Underscore,
}

impl Token {
    const COUNT: usize = 6;

    /// The two-unit token spelled `unit unit`, if any.
    fn double(unit: u16) -> Option<Self> {
        match unit {
            STAR => Some(Token::DoubleStar),
            UNDERSCORE => Some(Token::DoubleUnderscore),
            TILDE => Some(Token::DoubleTilde),
            PIPE => Some(Token::DoublePipe),
            _ => None,
        }
    }

    /// The one-unit italic token spelled `unit`, if any.
    fn single(unit: u16) -> Option<Self> {
        match unit {
            STAR => Some(Token::Star),
            UNDERSCORE => Some(Token::Underscore),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    fn width(self) -> usize {
        match self {
            Token::Star | Token::Underscore => 1,
            _ => 2,
        }
    }

    fn style(self) -> Style {
        match self {
            Token::DoubleStar | Token::DoubleUnderscore => Style::Bold,
            Token::DoubleTilde => Style::Strikethrough,
            Token::DoublePipe => Style::Spoiler,
            Token::Star | Token::Underscore => Style::Italic,
        }
    }
}

/// Result of scanning one body.
#[derive(Debug)]
pub struct Scan {
    pub marks: RemovalMarks,
    /// Discovered style ranges, in the order their markers closed.
    pub ranges: Vec<BodyRange>,
}

/// Scan `units` for markers.
pub fn scan(units: &[u16]) -> Scan {
    Scanner::new(units).run()
}

struct Scanner<'a> {
    units: &'a [u16],
    marks: RemovalMarks,
    ranges: Vec<BodyRange>,
    /// Opening index per token, `None` while closed.
    open: [Option<usize>; Token::COUNT],
    /// Opening index of the current monospace span.
    monospace: Option<usize>,
    /// Backticks not yet reached, minus those consumed by escapes.
    remaining_backticks: usize,
}

impl<'a> Scanner<'a> {
    fn new(units: &'a [u16]) -> Self {
        Self {
            units,
            marks: RemovalMarks::new(units.len()),
            ranges: Vec::new(),
            open: [None; Token::COUNT],
            monospace: None,
            remaining_backticks: units.iter().filter(|&&u| u == BACKTICK).count(),
        }
    }

    fn run(mut self) -> Scan {
        let mut i = 0;
        while i < self.units.len() {
            i += self.step(i);
        }

        // The backtick count makes this unreachable; an opener with no
        // closer must still not be stripped.
        if let Some(open) = self.monospace.take() {
            self.marks.keep(open);
        }

        Scan {
            marks: self.marks,
            ranges: self.ranges,
        }
    }

    fn peek(&self, i: usize) -> Option<u16> {
        self.units.get(i).copied()
    }

    /// Handle the unit at `i` and return how many units it consumed.
    fn step(&mut self, i: usize) -> usize {
        let unit = self.units[i];

        if unit == BACKTICK {
            self.backtick(i);
            return 1;
        }

        // Inside monospace everything is raw text, escapes included.
        if self.monospace.is_some() {
            return 1;
        }

        if unit == BACKSLASH {
            return match self.peek(i + 1) {
                Some(next) if is_escapable(next) => {
                    self.marks.remove(i);
                    if next == BACKTICK {
                        self.remaining_backticks -= 1;
                    }
                    2
                }
                _ => 1,
            };
        }

        if let Some(token) = Token::double(unit) {
            if self.peek(i + 1) == Some(unit) {
                self.toggle(token, i);
                return 2;
            }
        }

        if let Some(token) = Token::single(unit) {
            self.toggle(token, i);
        }
        1
    }

    fn backtick(&mut self, i: usize) {
        self.remaining_backticks -= 1;

        if let Some(open) = self.monospace.take() {
            self.marks.remove(i);
            // Single-unit spans run through the closer; remapping drops it.
            self.emit(Style::Monospace, open + 1, i - open);
        } else if self.remaining_backticks > 0 {
            // A closer is guaranteed, so the opener is flagged right away.
            self.marks.remove(i);
            self.monospace = Some(i);
        }
    }

    fn toggle(&mut self, token: Token, i: usize) {
        match self.open[token.slot()].take() {
            Some(open) => self.close(token, open, i),
            // Openers are only flagged once a closer turns up.
            None => self.open[token.slot()] = Some(i),
        }
    }

    fn close(&mut self, token: Token, open: usize, close: usize) {
        let width = token.width();
        for offset in 0..width {
            self.marks.remove(open + offset);
            self.marks.remove(close + offset);
        }

        let start = open + width;
        let length = if width == 1 {
            close - open
        } else {
            close - start
        };
        self.emit(token.style(), start, length);
    }

    fn emit(&mut self, style: Style, start: usize, length: usize) {
        trace!(%style, start, length, "closed marker");
        self.ranges.push(BodyRange::styled(start, length, style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn removed(found: &Scan, len: usize) -> Vec<usize> {
        (0..len).filter(|&i| found.marks.is_removed(i)).collect()
    }

    #[test]
    fn double_star_is_bold_not_two_italics() {
        let body = units("**bold**");
        let found = scan(&body);
        assert_eq!(found.ranges, vec![BodyRange::styled(2, 4, Style::Bold)]);
        assert_eq!(removed(&found, body.len()), vec![0, 1, 6, 7]);
    }

    #[test]
    fn italic_span_includes_its_closer() {
        let body = units("_it_");
        let found = scan(&body);
        assert_eq!(found.ranges, vec![BodyRange::styled(1, 3, Style::Italic)]);
        assert_eq!(removed(&found, body.len()), vec![0, 3]);
    }

    #[test]
    fn star_and_underscore_do_not_cross_close() {
        let body = units("*a_b*");
        let found = scan(&body);
        assert_eq!(found.ranges, vec![BodyRange::styled(1, 4, Style::Italic)]);
        assert_eq!(removed(&found, body.len()), vec![0, 4]);
    }

    #[test]
    fn unclosed_openers_are_not_flagged() {
        for body in ["**never", "~~never", "||never", "*never", "_never", "a ` b"] {
            let body = units(body);
            let found = scan(&body);
            assert!(found.ranges.is_empty());
            assert_eq!(found.marks.removed_count(), 0);
        }
    }

    #[test]
    fn escape_flags_only_the_backslash() {
        let body = units(r"\*x\*");
        let found = scan(&body);
        assert!(found.ranges.is_empty());
        assert_eq!(removed(&found, body.len()), vec![0, 3]);
    }

    #[test]
    fn backslash_before_plain_text_is_literal() {
        let body = units(r"a \ b \n");
        let found = scan(&body);
        assert_eq!(found.marks.removed_count(), 0);
    }

    #[test]
    fn monospace_suspends_other_tokens_and_escapes() {
        let body = units(r"`**x** \*`");
        let found = scan(&body);
        assert_eq!(found.ranges, vec![BodyRange::styled(1, 9, Style::Monospace)]);
        assert_eq!(removed(&found, body.len()), vec![0, 9]);
    }

    #[test]
    fn escaped_backtick_is_not_counted_as_a_closer() {
        let body = units(r"`a\`");
        let found = scan(&body);
        // The escape is inside the span, so the second backtick closes it.
        assert_eq!(found.ranges, vec![BodyRange::styled(1, 3, Style::Monospace)]);

        let body = units(r"\``a");
        let found = scan(&body);
        assert!(found.ranges.is_empty());
        assert_eq!(removed(&found, body.len()), vec![0]);
    }

    #[test]
    fn last_backtick_without_partner_is_literal() {
        let body = units("`a` `b");
        let found = scan(&body);
        assert_eq!(found.ranges, vec![BodyRange::styled(1, 2, Style::Monospace)]);
        assert_eq!(removed(&found, body.len()), vec![0, 2]);
    }

    #[test]
    fn ranges_follow_closing_order() {
        let body = units("***~~||`nested`||~~***");
        let styles: Vec<_> = scan(&body)
            .ranges
            .into_iter()
            .filter_map(|r| r.style)
            .collect();
        assert_eq!(
            styles,
            vec![
                Style::Monospace,
                Style::Spoiler,
                Style::Strikethrough,
                Style::Bold,
                Style::Italic,
            ]
        );
    }
}
