// Core types shared across the generators.
//
// Defines the sector coordinate (`SectorCoord`), the coordinate-to-key mixing
// every generator seeds its PRNG from, and the small color model the
// generators hand to renderers (`WebColor`, `Rgb`, `Rgba`). All types derive
// `Serialize` and `Deserialize` so snapshots can be handed to hosts as JSON.
//
// **Critical constraint: determinism.** `SectorCoord::key()` must never
// change. Star systems, nebulae and the resolver all re-derive
// the same key from the same coordinate so their existence draws agree.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell of the galaxy grid, or (independently) a planet's absolute
/// placement used to key its terrain. Never mutated; pure identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectorCoord {
    pub x: u32,
    pub y: u32,
}

impl SectorCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// The 32-bit PRNG state for this coordinate: low 16 bits of `x` in the
    /// high half, low 16 bits of `y` in the low half.
    ///
    /// Coordinates that agree modulo 65536 on both axes share a key, so the
    /// galaxy tiles with that period.
    pub const fn key(self) -> u32 {
        ((self.x & 0xFFFF) << 16) | (self.y & 0xFFFF)
    }

    /// Offset by `(dx, dy)` with wrap-around on both axes.
    pub const fn wrapping_offset(self, dx: u32, dy: u32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }
}

impl fmt::Display for SectorCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// An opaque 8-bit-per-channel color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

/// A color with alpha, used for translucent nebula clouds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// The named colors used by generators. Names are shown to players, so the
/// set is closed and each has a fixed RGB value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebColor {
    White,
    Yellow,
    Red,
    DarkRed,
    DarkBlue,
    Cyan,
    Magenta,
    Purple,
    OrangeRed,
    Orchid,
    PaleGoldenrod,
    PaleGreen,
    LightSkyBlue,
    Orange,
    LightGoldenrodYellow,
    YellowGreen,
    Blue,
    DarkViolet,
    LightCoral,
}

impl WebColor {
    pub const fn rgb(self) -> Rgb {
        match self {
            WebColor::White => Rgb::new(255, 255, 255),
            WebColor::Yellow => Rgb::new(255, 255, 0),
            WebColor::Red => Rgb::new(255, 0, 0),
            WebColor::DarkRed => Rgb::new(139, 0, 0),
            WebColor::DarkBlue => Rgb::new(0, 0, 139),
            WebColor::Cyan => Rgb::new(0, 255, 255),
            WebColor::Magenta => Rgb::new(255, 0, 255),
            WebColor::Purple => Rgb::new(128, 0, 128),
            WebColor::OrangeRed => Rgb::new(255, 69, 0),
            WebColor::Orchid => Rgb::new(218, 112, 214),
            WebColor::PaleGoldenrod => Rgb::new(238, 232, 170),
            WebColor::PaleGreen => Rgb::new(152, 251, 152),
            WebColor::LightSkyBlue => Rgb::new(135, 206, 250),
            WebColor::Orange => Rgb::new(255, 165, 0),
            WebColor::LightGoldenrodYellow => Rgb::new(250, 250, 210),
            WebColor::YellowGreen => Rgb::new(154, 205, 50),
            WebColor::Blue => Rgb::new(0, 0, 255),
            WebColor::DarkViolet => Rgb::new(148, 0, 211),
            WebColor::LightCoral => Rgb::new(240, 128, 128),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            WebColor::White => "White",
            WebColor::Yellow => "Yellow",
            WebColor::Red => "Red",
            WebColor::DarkRed => "DarkRed",
            WebColor::DarkBlue => "DarkBlue",
            WebColor::Cyan => "Cyan",
            WebColor::Magenta => "Magenta",
            WebColor::Purple => "Purple",
            WebColor::OrangeRed => "OrangeRed",
            WebColor::Orchid => "Orchid",
            WebColor::PaleGoldenrod => "PaleGoldenrod",
            WebColor::PaleGreen => "PaleGreen",
            WebColor::LightSkyBlue => "LightSkyBlue",
            WebColor::Orange => "Orange",
            WebColor::LightGoldenrodYellow => "LightGoldenrodYellow",
            WebColor::YellowGreen => "YellowGreen",
            WebColor::Blue => "Blue",
            WebColor::DarkViolet => "DarkViolet",
            WebColor::LightCoral => "LightCoral",
        }
    }
}

impl fmt::Display for WebColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Star palette. Index order is fixed: the star color draw is an
/// index into this table.
pub const STAR_PALETTE: [WebColor; 16] = [
    WebColor::White,
    WebColor::Yellow,
    WebColor::Red,
    WebColor::DarkRed,
    WebColor::DarkBlue,
    WebColor::Cyan,
    WebColor::Magenta,
    WebColor::Purple,
    WebColor::OrangeRed,
    WebColor::Orchid,
    WebColor::PaleGoldenrod,
    WebColor::PaleGreen,
    WebColor::LightSkyBlue,
    WebColor::Orange,
    WebColor::LightGoldenrodYellow,
    WebColor::YellowGreen,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_packs_low_halves() {
        assert_eq!(SectorCoord::new(0, 0).key(), 0);
        assert_eq!(SectorCoord::new(9, 0).key(), 0x0009_0000);
        assert_eq!(SectorCoord::new(1, 2).key(), 0x0001_0002);
        assert_eq!(SectorCoord::new(0x1_0003, 0xABCD_0004).key(), 0x0003_0004);
    }

    #[test]
    fn key_period_is_65536() {
        let a = SectorCoord::new(12, 34);
        let b = SectorCoord::new(12 + 65536, 34 + 3 * 65536);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn wrapping_offset_wraps() {
        let c = SectorCoord::new(u32::MAX, 5).wrapping_offset(2, 1);
        assert_eq!(c, SectorCoord::new(1, 6));
    }

    #[test]
    fn palette_has_no_duplicates() {
        for (i, a) in STAR_PALETTE.iter().enumerate() {
            for b in &STAR_PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn color_names_match_display() {
        assert_eq!(WebColor::PaleGoldenrod.to_string(), "PaleGoldenrod");
        assert_eq!(WebColor::Orange.rgb(), Rgb::new(255, 165, 0));
    }
}
