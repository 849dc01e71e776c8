use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

/// 8-bit sRGB color, serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Srgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb::new(0, 0, 0);
    pub const WHITE: Srgb = Srgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

impl fmt::Display for Srgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Srgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ColorParseError::BadFormat(s.to_string());
        let hex = s.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| bad());
        match hex.len() {
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #rgb shorthand doubles every digit
            3 => {
                let r = channel(&hex[0..1])?;
                let g = channel(&hex[1..2])?;
                let b = channel(&hex[2..3])?;
                Ok(Self::new(r * 17, g * 17, b * 17))
            }
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Srgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Srgb> for String {
    fn from(value: Srgb) -> Self {
        value.to_string()
    }
}

/// Runtime color settings. Changing any of them re-tints existing instances
/// without touching the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub top_node_color: Srgb,
    pub normal_node_color: Srgb,
    pub line_color: Srgb,
    pub hover_color: Srgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            top_node_color: Srgb::new(0xe5, 0x76, 0x7f),
            normal_node_color: Srgb::WHITE,
            line_color: Srgb::new(0xf0, 0xf0, 0xf0),
            hover_color: Srgb::new(0xff, 0x47, 0x57),
        }
    }
}

impl Palette {
    pub fn node_color(&self, is_hub: bool) -> Srgb {
        if is_hub {
            self.top_node_color
        } else {
            self.normal_node_color
        }
    }
}
