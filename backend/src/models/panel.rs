//! Seven-slot panel notation stored inside a single chart cell.
//!
//! ```text
//!  tl      tr
//!  ml  mc  mr
//!  bl      br
//! ```
//!
//! Canonical wire format is pipe-delimited with fixed positions, three lines:
//! `"tl|tr\nml|mc|mr\nbl|br"`. Cells written by the previous editor used a
//! whitespace-delimited layout; those are still decoded through
//! [`Panel::parse_legacy`], selected explicitly because canonical strings always
//! contain a `|` and legacy strings never can.
//!
//! A cell holding a single line without `|` is a plain value, not a panel.

use serde::{Deserialize, Serialize};

/// Maximum characters per slot.
pub const MAX_TOKEN_LEN: usize = 2;

/// Column delimiter of the canonical format.
pub const PANEL_DELIMITER: char = '|';

/// Which encoding a raw cell string uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEncoding {
    /// `tl|tr\nml|mc|mr\nbl|br`
    Pipe,
    /// `tl tr\nml mc mr\nbl br`, empty slots dropped
    LegacyWhitespace,
}

impl PanelEncoding {
    pub fn detect(raw: &str) -> Self {
        if raw.contains(PANEL_DELIMITER) {
            PanelEncoding::Pipe
        } else {
            PanelEncoding::LegacyWhitespace
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Panel {
    pub tl: String,
    pub tr: String,
    pub ml: String,
    pub mc: String,
    pub mr: String,
    pub bl: String,
    pub br: String,
}

impl Panel {
    /// Decode a cell string, choosing the decoder from [`PanelEncoding::detect`].
    pub fn parse(raw: &str) -> Self {
        match PanelEncoding::detect(raw) {
            PanelEncoding::Pipe => Self::parse_canonical(raw),
            PanelEncoding::LegacyWhitespace => Self::parse_legacy(raw),
        }
    }

    /// Decode the pipe-delimited format.
    pub fn parse_canonical(raw: &str) -> Self {
        Self::from_lines(raw, |line| line.split(PANEL_DELIMITER).collect())
    }

    /// Decode the whitespace-delimited format written by the previous editor.
    ///
    /// Slots are filled left to right from the tokens present on each line, so
    /// a line that lost an empty leading slot shifts its values left. That
    /// ambiguity is inherent to the format.
    pub fn parse_legacy(raw: &str) -> Self {
        Self::from_lines(raw, |line| line.split_whitespace().collect())
    }

    fn from_lines<'a>(raw: &'a str, split: impl Fn(&'a str) -> Vec<&'a str>) -> Self {
        let mut lines = raw.split('\n').map(|l| split(l.trim_end_matches('\r')));
        let top = lines.next().unwrap_or_default();
        let middle = lines.next().unwrap_or_default();
        let bottom = lines.next().unwrap_or_default();

        let slot = |tokens: &[&str], i: usize| tokens.get(i).map_or_else(String::new, |t| clamp_token(t));

        Self {
            tl: slot(&top, 0),
            tr: slot(&top, 1),
            ml: slot(&middle, 0),
            mc: slot(&middle, 1),
            mr: slot(&middle, 2),
            bl: slot(&bottom, 0),
            br: slot(&bottom, 1),
        }
    }

    /// Encode in the canonical pipe format. Always three lines.
    pub fn serialize(&self) -> String {
        let d = PANEL_DELIMITER;
        format!(
            "{}{d}{}\n{}{d}{}{d}{}\n{}{d}{}",
            self.tl, self.tr, self.ml, self.mc, self.mr, self.bl, self.br
        )
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|s| s.is_empty())
    }

    /// Slots in reading order: tl, tr, ml, mc, mr, bl, br.
    pub fn slots(&self) -> [&str; 7] {
        [
            self.tl.as_str(),
            self.tr.as_str(),
            self.ml.as_str(),
            self.mc.as_str(),
            self.mr.as_str(),
            self.bl.as_str(),
            self.br.as_str(),
        ]
    }

    /// True when every slot already satisfies the character and length limits.
    pub fn is_valid(&self) -> bool {
        self.slots().iter().all(|s| clamp_token(s) == *s)
    }
}

/// Longest single-line value accepted for a chart cell.
pub const MAX_PLAIN_CELL_LEN: usize = 16;

/// Normalize free text typed into a chart cell into its stored form.
///
/// Multi-line or pipe-delimited input is a panel: it is decoded in either
/// encoding, clamped and re-encoded canonically, and a panel with no values is
/// stored as the empty string. Single-line input is a plain value: disallowed
/// characters are dropped and whitespace runs collapse to one space.
pub fn normalize_cell_value(raw: &str) -> String {
    if raw.contains('\n') || raw.contains(PANEL_DELIMITER) {
        let panel = Panel::parse(raw);
        return if panel.is_empty() {
            String::new()
        } else {
            panel.serialize()
        };
    }

    raw.split_whitespace()
        .map(|token| token.chars().filter(|c| is_allowed_char(*c)).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_PLAIN_CELL_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '*' | '#' | '@')
}

/// Keep only allowed characters and at most [`MAX_TOKEN_LEN`] of them.
pub fn clamp_token(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| is_allowed_char(*c))
        .take(MAX_TOKEN_LEN)
        .collect()
}
