//! Cabinet programs driving the arcade peripheral.

use intcode::arcade::FREE_PLAY_ADDRESS;
use intcode::{Arcade, HaltReason, Point, Tile};
use test_log::test;

/// Doubles (coin) or squares (free play) address 0 into a credit cell,
/// draws a paddle and a ball, reads the joystick, then reports
/// credits + joystick as the score.
const CABINET: [i64; 32] = [
    1, 0, 0, 29,
    104, 2, 104, 5, 104, 3,
    104, 4, 104, 3, 104, 4,
    3, 30,
    104, -1, 104, 0,
    1, 29, 30, 31,
    4, 31,
    99,
    0, 0, 0,
];

#[test]
fn test_coin_play() {
    let mut machine = Arcade::boot(&CABINET, false);
    assert_eq!(machine.run(), Ok(HaltReason::Halt));

    let arcade = machine.peripheral();
    assert_eq!(arcade.moves(), 1);
    assert_eq!(machine.peek(30), 1);
    assert_eq!(arcade.screen().score(), 3);
    assert_eq!(machine.cycles(), 13);
}

#[test]
fn test_free_play() {
    let mut machine = Arcade::boot(&CABINET, true);
    assert_eq!(machine.peek(FREE_PLAY_ADDRESS), 2);
    machine.run().unwrap();

    let screen = machine.peripheral().screen();
    assert_eq!(screen.score(), 5);
    assert_eq!(screen.paddle(), Some(Point::new(2, 5)));
    assert_eq!(screen.ball(), Some(Point::new(4, 3)));
}

#[test]
fn test_joystick_follows_ball_left() {
    let mut program = CABINET;
    // Move the ball to x = 0
    program[11] = 0;

    let mut machine = Arcade::boot(&program, false);
    machine.run().unwrap();

    assert_eq!(machine.peek(30), -1);
    assert_eq!(machine.peripheral().screen().score(), 1);
}

#[test]
fn test_screen_after_run() {
    let mut machine = Arcade::boot(&CABINET, true);
    machine.run().unwrap();

    let screen = machine.peripheral().screen();
    assert_eq!(screen.tile_at(Point::new(2, 5)), Tile::Paddle);
    assert_eq!(screen.tile_at(Point::new(4, 3)), Tile::Ball);
    assert_eq!(screen.tile_at(Point::new(0, 0)), Tile::Empty);
    assert_eq!(screen.count(Tile::Block), 0);
    assert_eq!(screen.bounds(), (4, 5));
    assert!(screen.render().starts_with("SCORE: 5\n"));
}

#[test]
fn test_run_limited_pauses_game() {
    let mut machine = Arcade::boot(&CABINET, true);

    assert_eq!(machine.run_limited(4), Ok(None));
    assert_eq!(machine.peripheral().screen().paddle(), Some(Point::new(2, 5)));
    assert_eq!(machine.peripheral().screen().ball(), None);

    assert_eq!(machine.run_limited(100), Ok(Some(HaltReason::Halt)));
    assert_eq!(machine.peripheral().screen().score(), 5);
}
