//! Caption highlight markup.
//!
//! `##word##` marks a highlighted span. Spans do not nest and their content may not contain `#`;
//! anything that does not form a complete span stays literal text. On the cover page a legacy
//! `=word=` pair is also accepted and simply unwrapped.

use crate::foundation::core::Rgba8;

/// Highlight delimiter, used on both sides of a span.
pub const HIGHLIGHT_MARKER: [char; 2] = ['#', '#'];
/// Legacy single-character delimiter, cover page only.
pub const LEGACY_MARKER: char = '=';

/// One caption block: the full caption with every character outside this run blanked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyledRun {
    pub text: String,
    pub highlighted: bool,
    pub color: Rgba8,
}

/// Caption text with markers removed, plus a per-character highlight mask.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkupScan {
    chars: Vec<char>,
    highlighted: Vec<bool>,
}

impl MarkupScan {
    /// Scan `text` for `##...##` spans in one left-to-right pass.
    pub fn scan(text: &str) -> Self {
        let src: Vec<char> = text.chars().collect();
        let mut out = Self {
            chars: Vec::with_capacity(src.len()),
            highlighted: Vec::with_capacity(src.len()),
        };

        let mut i = 0;
        while i < src.len() {
            if let Some(close) = match_span(&src, i, &HIGHLIGHT_MARKER) {
                for &c in &src[i + 2..close] {
                    out.chars.push(c);
                    out.highlighted.push(true);
                }
                i = close + 2;
                continue;
            }
            out.chars.push(src[i]);
            out.highlighted.push(false);
            i += 1;
        }
        out
    }

    /// Caption text with all matched markers removed.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn has_highlight(&self) -> bool {
        self.highlighted.iter().any(|&h| h)
    }

    /// Per-character highlight flags, aligned with [`MarkupScan::text`]'s chars.
    pub fn mask(&self) -> &[bool] {
        &self.highlighted
    }

    /// Caption text where characters whose highlight flag differs from `highlighted` are
    /// replaced by spaces. Line breaks are always kept so both runs wrap identically.
    pub fn run_text(&self, highlighted: bool) -> String {
        self.chars
            .iter()
            .zip(&self.highlighted)
            .map(|(&c, &h)| {
                if h == highlighted || c == '\n' || c == '\r' {
                    c
                } else {
                    ' '
                }
            })
            .collect()
    }

    /// Split into the normal run (always) and the highlighted run (only if it has visible text).
    pub fn runs(&self, normal: Rgba8, highlight: Rgba8) -> Vec<StyledRun> {
        let mut runs = vec![StyledRun {
            text: self.run_text(false),
            highlighted: false,
            color: normal,
        }];
        if !self.has_highlight() {
            return runs;
        }
        let text = self.run_text(true);
        if text.chars().any(|c| !c.is_whitespace()) {
            runs.push(StyledRun {
                text,
                highlighted: true,
                color: highlight,
            });
        }
        runs
    }
}

/// Parse caption markup into styled runs covering the whole caption.
pub fn parse_markup(text: &str, normal: Rgba8, highlight: Rgba8) -> Vec<StyledRun> {
    MarkupScan::scan(text).runs(normal, highlight)
}

/// Unwrap legacy `=word=` pairs. Unpaired `=` stays literal.
pub fn strip_legacy_markers(text: &str) -> String {
    let src: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < src.len() {
        if let Some(close) = match_span(&src, i, &[LEGACY_MARKER]) {
            out.extend(&src[i + 1..close]);
            i = close + 1;
            continue;
        }
        out.push(src[i]);
        i += 1;
    }
    out
}

/// Caption text with every marker removed, for narration, prompts and duration estimates.
pub fn plain_text(text: &str) -> String {
    MarkupScan::scan(&strip_legacy_markers(text)).text()
}

/// If a complete span delimited by `marker` opens at `open`, return the index of its closing
/// delimiter. Content must be non-empty and free of the delimiter's first character.
fn match_span(src: &[char], open: usize, marker: &[char]) -> Option<usize> {
    let m = marker.len();
    if src.get(open..open + m)? != marker {
        return None;
    }
    let content_start = open + m;
    let close = src[content_start..]
        .iter()
        .position(|&c| c == marker[0])
        .map(|p| content_start + p)?;
    if close == content_start {
        return None;
    }
    (src.get(close..close + m)? == marker).then_some(close)
}

#[cfg(test)]
#[path = "../../tests/unit/text/markup.rs"]
mod tests;
