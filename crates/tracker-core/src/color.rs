//! Workstream display colors.
//!
//! A workstream is drawn with its stored `color` when that is a valid
//! `#rrggbb` value. Otherwise the fixed palette keyed by workstream name
//! applies, and anything else falls back to near-black.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 24-bit color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Color used when neither the stored value nor the palette applies.
    pub const FALLBACK: Rgb = Rgb::new(0x11, 0x11, 0x11);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(CoreError::InvalidColor(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| CoreError::InvalidColor(s.to_string()))
        };

        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The fixed set of workstream names and their palette colors.
pub const WORKSTREAM_PALETTE: [(&str, Rgb); 4] = [
    ("兒少組", Rgb::new(0x25, 0x63, 0xeb)),     // blue
    ("研發組", Rgb::new(0x16, 0xa3, 0x4a)),     // green
    ("數位推廣組", Rgb::new(0x7c, 0x3a, 0xed)), // purple
    ("行政組", Rgb::new(0xea, 0x58, 0x0c)),     // orange
];

/// Palette color for a workstream name, if it is one of the fixed names.
pub fn palette_color(name: &str) -> Option<Rgb> {
    WORKSTREAM_PALETTE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, color)| *color)
}

/// Display color: a valid stored hex first, then the name palette, then
/// the fallback.
pub fn resolve_color(stored: Option<&str>, name: &str) -> Rgb {
    stored
        .and_then(|hex| Rgb::from_hex(hex).ok())
        .or_else(|| palette_color(name))
        .unwrap_or(Rgb::FALLBACK)
}
