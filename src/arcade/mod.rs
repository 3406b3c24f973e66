//! Arcade cabinet peripheral.
//!
//! This module implements the cabinet that the arcade program drives:
//! - tile types and their glyphs
//! - the screen, which reassembles output triples into a grid and score
//! - the cabinet itself, which answers input requests by tracking the ball

pub mod tile;
pub mod screen;
pub mod cabinet;

pub use tile::Tile;
pub use screen::{OutputPhase, Point, Screen, SCORE_SENTINEL_X};
pub use cabinet::{Arcade, Joystick, FREE_PLAY_ADDRESS, FREE_PLAY_QUARTERS};
