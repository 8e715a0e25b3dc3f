//! Display colors for mesh faces

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// An opaque sRGB color, written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Light grey used for freshly loaded faces
pub const DEFAULT_FACE_COLOR: Color = Color::rgb(0x9c, 0xa3, 0xaf);

/// The sixteen swatches offered by the color panel.
///
/// This is a UI convenience only; any [`Color`] is accepted by the editor.
pub const PALETTE: [Color; 16] = [
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0xf9, 0x73, 0x16),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0xea, 0xb3, 0x08),
    Color::rgb(0x84, 0xcc, 0x16),
    Color::rgb(0x22, 0xc5, 0x5e),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0x14, 0xb8, 0xa6),
    Color::rgb(0x06, 0xb6, 0xd4),
    Color::rgb(0x0e, 0xa5, 0xe9),
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x63, 0x66, 0xf1),
    Color::rgb(0x8b, 0x5c, 0xf6),
    Color::rgb(0xa8, 0x55, 0xf7),
    Color::rgb(0xd9, 0x46, 0xef),
    Color::rgb(0xec, 0x48, 0x99),
];

impl Color {
    /// Create a color from its 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to `0.0..=1.0`, as expected by shaders
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_FACE_COLOR
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidData(format!("Invalid color: {:?}", s));
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Self::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
