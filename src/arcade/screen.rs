//! Arcade screen state.
//!
//! The cabinet program draws by emitting `(x, y, tile)` triples. A triple
//! whose x is -1 is not a tile at all: its third value is the new score.

use super::tile::Tile;
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// X coordinate that marks a score update instead of a tile.
pub const SCORE_SENTINEL_X: i64 = -1;

/// A screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Which value of the current triple the screen expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputPhase {
    #[default]
    ExpectX,
    ExpectY,
    ExpectTile,
}

/// Tile grid, score and tracked object positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    #[serde(with = "cells")]
    tiles: HashMap<Point, Tile>,
    score: i64,
    ball: Option<Point>,
    paddle: Option<Point>,
    max_x: i64,
    max_y: i64,
    phase: OutputPhase,
    pending_x: i64,
    pending_y: i64,
}

impl Screen {
    /// Create a blank screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output value from the machine.
    pub fn feed(&mut self, value: i64) {
        match self.phase {
            OutputPhase::ExpectX => {
                self.pending_x = value;
                self.max_x = self.max_x.max(value);
                self.phase = OutputPhase::ExpectY;
            }
            OutputPhase::ExpectY => {
                self.pending_y = value;
                self.max_y = self.max_y.max(value);
                self.phase = OutputPhase::ExpectTile;
            }
            OutputPhase::ExpectTile => {
                if self.pending_x == SCORE_SENTINEL_X {
                    log::debug!("score {} -> {}", self.score, value);
                    self.score = value;
                } else {
                    let point = Point::new(self.pending_x, self.pending_y);
                    self.place(point, Tile::from_code(value));
                }
                self.phase = OutputPhase::ExpectX;
            }
        }
    }

    fn place(&mut self, point: Point, tile: Tile) {
        self.tiles.insert(point, tile);
        match tile {
            Tile::Ball => self.ball = Some(point),
            Tile::Paddle => self.paddle = Some(point),
            _ => (),
        }
    }

    /// Tile at `point`; cells never drawn are empty.
    pub fn tile_at(&self, point: Point) -> Tile {
        self.tiles.get(&point).copied().unwrap_or_default()
    }

    /// Number of drawn cells currently showing `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.values().filter(|&&t| t == tile).count()
    }

    /// All drawn cells.
    pub fn tiles(&self) -> impl Iterator<Item = (Point, Tile)> + '_ {
        self.tiles.iter().map(|(&p, &t)| (p, t))
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Last position the ball was drawn at.
    pub fn ball(&self) -> Option<Point> {
        self.ball
    }

    /// Last position the paddle was drawn at.
    pub fn paddle(&self) -> Option<Point> {
        self.paddle
    }

    /// Largest x and y seen so far.
    pub fn bounds(&self) -> (i64, i64) {
        (self.max_x, self.max_y)
    }

    pub fn phase(&self) -> OutputPhase {
        self.phase
    }

    /// Largest x and y that fit in a `width` by `height` window anchored at
    /// the origin. `None` when the window is empty.
    pub fn visible_bounds(&self, width: usize, height: usize) -> Option<(i64, i64)> {
        let width = i64::try_from(width).unwrap_or(i64::MAX);
        let height = i64::try_from(height).unwrap_or(i64::MAX);
        if width == 0 || height == 0 {
            return None;
        }
        Some((self.max_x.min(width - 1), self.max_y.min(height - 1)))
    }

    /// Render rows `0..=max_y`, each covering columns `0..=max_x`.
    ///
    /// The grid is dense: one glyph per cell up to the largest coordinate
    /// drawn, so a single far-off triple makes it very large. Use
    /// [`Screen::rows_within`] to cap the size.
    pub fn rows(&self) -> Vec<String> {
        self.rows_up_to(self.max_x, self.max_y)
    }

    /// Like [`Screen::rows`], clipped to a `width` by `height` window.
    pub fn rows_within(&self, width: usize, height: usize) -> Vec<String> {
        match self.visible_bounds(width, height) {
            Some((max_x, max_y)) => self.rows_up_to(max_x, max_y),
            None => Vec::new(),
        }
    }

    fn rows_up_to(&self, max_x: i64, max_y: i64) -> Vec<String> {
        (0..=max_y)
            .map(|y| {
                (0..=max_x)
                    .map(|x| self.tile_at(Point::new(x, y)).glyph())
                    .collect()
            })
            .collect()
    }

    /// Render the score line followed by the grid.
    ///
    /// Same size caveat as [`Screen::rows`].
    pub fn render(&self) -> String {
        let mut output = format!("SCORE: {}\n", self.score);
        for row in self.rows() {
            output.push_str(&row);
            output.push('\n');
        }
        output
    }
}

/// Serializes the grid as a list of `(point, tile)` pairs, since struct keys
/// are not valid map keys in most formats.
mod cells {
    use super::{Point, Tile};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S: Serializer>(tiles: &HashMap<Point, Tile>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(tiles.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<HashMap<Point, Tile>, D::Error> {
        let cells = Vec::<(Point, Tile)>::deserialize(deserializer)?;
        Ok(cells.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(screen: &mut Screen, values: &[i64]) {
        for &value in values {
            screen.feed(value);
        }
    }

    #[test]
    fn test_sentinel_triple_is_not_drawn() {
        let mut screen = Screen::new();
        feed_all(&mut screen, &[5, 7, 3, -1, 0, 42]);

        assert_eq!(screen.tile_at(Point::new(5, 7)), Tile::Paddle);
        assert_eq!(screen.score(), 42);
        assert!(screen.tiles().all(|(p, _)| p != Point::new(-1, 0)));
        assert_eq!(screen.tiles().count(), 1);
    }

    #[test]
    fn test_block_and_score() {
        let mut screen = Screen::new();
        feed_all(&mut screen, &[5, 7, 2, -1, 0, 42]);

        assert_eq!(screen.tile_at(Point::new(5, 7)), Tile::Block);
        assert_eq!(screen.count(Tile::Block), 1);
        assert_eq!(screen.score(), 42);
        assert_eq!(screen.tile_at(Point::new(-1, 0)), Tile::Empty);
        assert_eq!(screen.tiles().count(), 1);
    }

    #[test]
    fn test_phase_cycle() {
        let mut screen = Screen::new();
        assert_eq!(screen.phase(), OutputPhase::ExpectX);
        screen.feed(1);
        assert_eq!(screen.phase(), OutputPhase::ExpectY);
        screen.feed(2);
        assert_eq!(screen.phase(), OutputPhase::ExpectTile);
        screen.feed(1);
        assert_eq!(screen.phase(), OutputPhase::ExpectX);
        assert_eq!(screen.tile_at(Point::new(1, 2)), Tile::Wall);
    }

    #[test]
    fn test_tracks_ball_and_paddle() {
        let mut screen = Screen::new();
        assert_eq!(screen.ball(), None);

        feed_all(&mut screen, &[3, 4, 4, 6, 9, 3]);
        assert_eq!(screen.ball(), Some(Point::new(3, 4)));
        assert_eq!(screen.paddle(), Some(Point::new(6, 9)));

        // Ball moves: old cell cleared, new cell drawn
        feed_all(&mut screen, &[3, 4, 0, 4, 5, 4]);
        assert_eq!(screen.ball(), Some(Point::new(4, 5)));
        assert_eq!(screen.tile_at(Point::new(3, 4)), Tile::Empty);
    }

    #[test]
    fn test_bounds_grow_from_insertions() {
        let mut screen = Screen::new();
        assert_eq!(screen.bounds(), (0, 0));

        feed_all(&mut screen, &[12, 3, 1, 2, 20, 1, -1, 0, 100]);
        assert_eq!(screen.bounds(), (12, 20));
    }

    #[test]
    fn test_render() {
        let mut screen = Screen::new();
        feed_all(&mut screen, &[0, 0, 1, 2, 0, 1, 1, 1, 4, -1, 0, 7]);

        let expected = format!(
            "SCORE: 7\n{w} {w}\n {b} \n",
            w = Tile::Wall.glyph(),
            b = Tile::Ball.glyph()
        );
        assert_eq!(screen.render(), expected);
    }

    #[test]
    fn test_rows_within_clips_far_triples() {
        let mut screen = Screen::new();
        feed_all(&mut screen, &[1, 1, 1, 3_000_000, 2, 2]);

        assert_eq!(screen.visible_bounds(10, 4), Some((9, 2)));
        assert_eq!(screen.visible_bounds(0, 4), None);

        let rows = screen.rows_within(10, 4);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.chars().count() == 10));
        assert_eq!(rows[1].chars().nth(1), Some(Tile::Wall.glyph()));
        assert!(screen.rows_within(0, 0).is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut screen = Screen::new();
        feed_all(&mut screen, &[0, 0, 1, 3, 4, 3, 5, 2, 4, -1, 0, 12, 4, 2]);

        let json = serde_json::to_string(&screen).unwrap();
        let restored: Screen = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, screen);
        assert_eq!(restored.phase(), OutputPhase::ExpectTile);
        assert_eq!(restored.ball(), Some(Point::new(5, 2)));
        assert_eq!(restored.score(), 12);
    }
}
