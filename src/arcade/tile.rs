//! Arcade tile types.

use serde::{Serialize, Deserialize};

/// What occupies one cell of the arcade screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Nothing here (code 0).
    #[default]
    Empty,
    /// Indestructible wall (code 1).
    Wall,
    /// Breakable block (code 2).
    Block,
    /// The horizontal paddle (code 3).
    Paddle,
    /// The ball (code 4).
    Ball,
}

impl Tile {
    /// All tiles in code order.
    pub const ALL: [Tile; 5] = [Tile::Empty, Tile::Wall, Tile::Block, Tile::Paddle, Tile::Ball];

    /// Create from a wire code. Unknown codes decode as empty.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Tile::Empty,
            1 => Tile::Wall,
            2 => Tile::Block,
            3 => Tile::Paddle,
            4 => Tile::Ball,
            other => {
                log::debug!("unknown tile code {}, drawing as empty", other);
                Tile::Empty
            }
        }
    }

    /// Convert to a wire code.
    pub fn code(self) -> i64 {
        match self {
            Tile::Empty => 0,
            Tile::Wall => 1,
            Tile::Block => 2,
            Tile::Paddle => 3,
            Tile::Ball => 4,
        }
    }

    /// Display glyph.
    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '\u{2588}',
            Tile::Block => '\u{2591}',
            Tile::Paddle => '\u{2594}',
            Tile::Ball => '\u{25CE}',
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
