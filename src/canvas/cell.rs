//! Canvas cells

use super::color::{Color, RESET};
use std::fmt;

/// First code point of the Unicode braille block.
pub const BRAILLE_OFFSET: u32 = 0x2800;

/// Dot bit for sub-pixel `[row][col]` inside a 2×4 braille cell.
pub const BRAILLE: [[u8; 2]; 4] = [
    [0x01, 0x08],
    [0x02, 0x10],
    [0x04, 0x20],
    [0x40, 0x80],
];

pub const Y_AXIS: char = '┤';
pub const X_AXIS: char = '─';
pub const ORIGIN: char = '╰';
pub const X_LABEL_MARKER: char = '┬';
pub const LABEL_START: char = '└';
pub const LABEL_END: char = '┘';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Packed braille dots
    Braille(u8),
    /// Axis line or label text
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: Glyph,
    pub color: Color,
}

impl Cell {
    pub fn text(ch: char, color: Color) -> Self {
        Self {
            glyph: Glyph::Char(ch),
            color,
        }
    }

    /// OR the dot at sub-pixel (`sub_col`, `sub_row`) into this cell. Any
    /// text previously in the cell is replaced.
    pub fn with_dot(existing: Option<Cell>, sub_col: usize, sub_row: usize, color: Color) -> Self {
        let bits = match existing.map(|c| c.glyph) {
            Some(Glyph::Braille(bits)) => bits,
            _ => 0,
        };
        Self {
            glyph: Glyph::Braille(bits | BRAILLE[sub_row % 4][sub_col % 2]),
            color,
        }
    }

    pub fn symbol(&self) -> char {
        match self.glyph {
            Glyph::Braille(bits) => {
                char::from_u32(BRAILLE_OFFSET + bits as u32).unwrap_or(' ')
            }
            Glyph::Char(ch) => ch,
        }
    }
}

/// The glyph wrapped in its color escape, or bare for the default color.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Color::Default => write!(f, "{}", self.symbol()),
            color => write!(f, "{}{}{}", color, self.symbol(), RESET),
        }
    }
}
