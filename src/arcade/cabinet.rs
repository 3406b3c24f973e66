//! The arcade cabinet peripheral.

use super::screen::Screen;
use crate::vm::{IoError, Machine, Peripheral};
use serde::{Serialize, Deserialize};
use std::cmp::Ordering;

/// Address the cabinet program reads its play mode from.
pub const FREE_PLAY_ADDRESS: u64 = 0;

/// Value at [`FREE_PLAY_ADDRESS`] that starts a game without quarters.
pub const FREE_PLAY_QUARTERS: i64 = 2;

/// Joystick position fed to the machine on every input request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Joystick {
    Left,
    Neutral,
    Right,
}

impl Joystick {
    /// Move toward the ball: right if the paddle is left of it, left if it
    /// is right of it, otherwise stay put.
    pub fn tracking(paddle_x: i64, ball_x: i64) -> Self {
        match paddle_x.cmp(&ball_x) {
            Ordering::Less => Joystick::Right,
            Ordering::Greater => Joystick::Left,
            Ordering::Equal => Joystick::Neutral,
        }
    }

    /// Input value understood by the cabinet program.
    pub fn value(self) -> i64 {
        match self {
            Joystick::Left => -1,
            Joystick::Neutral => 0,
            Joystick::Right => 1,
        }
    }
}

/// Arcade cabinet: draws machine output and steers the paddle itself.
#[derive(Debug, Clone, Default)]
pub struct Arcade {
    screen: Screen,
    moves: u64,
}

impl Arcade {
    /// Create a cabinet with a blank screen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a machine running the cabinet `program` with a fresh cabinet
    /// attached. With `free_play`, the program is patched to skip the coin
    /// slot before it runs.
    pub fn boot(program: &[i64], free_play: bool) -> Machine<Arcade> {
        let mut machine = Machine::with_peripheral(program, Arcade::new());
        if free_play {
            machine.poke(FREE_PLAY_ADDRESS, FREE_PLAY_QUARTERS);
        }
        machine
    }

    /// Joystick position for the current screen.
    ///
    /// An object that has not been drawn yet counts as sitting at the origin.
    pub fn joystick(&self) -> Joystick {
        let paddle = self.screen.paddle().unwrap_or_default();
        let ball = self.screen.ball().unwrap_or_default();
        Joystick::tracking(paddle.x, ball.x)
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Number of joystick values handed to the machine.
    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl Peripheral for Arcade {
    fn request_input(&mut self) -> Result<i64, IoError> {
        let joystick = self.joystick();
        self.moves += 1;
        log::trace!("joystick {:?} (score {})", joystick, self.screen.score());
        Ok(joystick.value())
    }

    fn emit_output(&mut self, value: i64) {
        self.screen.feed(value);
    }
}
