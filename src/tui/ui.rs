//! UI rendering for the arcade viewer.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
    style::{Color, Style, Modifier},
};
use crate::arcade::{Point, Tile};
use super::app::ViewerApp;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &ViewerApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70),
            Constraint::Percentage(30),
        ])
        .split(frame.area());

    // Left side: cabinet screen and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_screen(frame, left_chunks[0], app);
    draw_status(frame, left_chunks[1], app);

    // Right side: machine state and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
        ])
        .split(chunks[1]);

    draw_machine(frame, right_chunks[0], app);
    draw_help(frame, right_chunks[1]);
}

/// Draw the tile grid with colored tiles.
fn draw_screen(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let screen = app.machine.peripheral().screen();
    // Clip to the panel, less its borders
    let (width, height) = (area.width.saturating_sub(2), area.height.saturating_sub(2));
    let (max_x, max_y) = screen
        .visible_bounds(width.into(), height.into())
        .unwrap_or((-1, -1));

    let lines: Vec<Line> = (0..=max_y)
        .map(|y| {
            let spans: Vec<Span> = (0..=max_x)
                .map(|x| {
                    let tile = screen.tile_at(Point::new(x, y));
                    Span::styled(tile.glyph().to_string(), tile_style(tile))
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = format!(" Score: {} ", screen.score());
    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(paragraph, area);
}

/// Draw machine registers and cabinet counters.
fn draw_machine(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let machine = &app.machine;
    let arcade = machine.peripheral();
    let screen = arcade.screen();

    let position = |p: Option<Point>| match p {
        Some(p) => format!("({}, {})", p.x, p.y),
        None => "-".to_string(),
    };

    let content = vec![
        Line::from(vec![
            Span::raw("PC:     "),
            Span::styled(format!("{}", machine.pc()), Style::default().fg(Color::Yellow)),
        ]),
        Line::from(vec![
            Span::raw("Base:   "),
            Span::styled(format!("{}", machine.relative_base()), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", machine.cycles()), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::raw("State:  "),
            Span::styled(format!("{:?}", machine.state()),
                if machine.is_running() {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::Red)
                }),
        ]),
        Line::from(""),
        Line::from(format!("Blocks: {}", screen.count(Tile::Block))),
        Line::from(format!("Ball:   {}", position(screen.ball()))),
        Line::from(format!("Paddle: {}", position(screen.paddle()))),
        Line::from(format!("Moves:  {}", arcade.moves())),
        Line::from(format!("Speed:  x{}", app.speed)),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Machine ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

/// Draw status bar.
fn draw_status(frame: &mut Frame, area: Rect, app: &ViewerApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

/// Draw help panel.
fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("r: Run  p: Pause  s: Step"),
        Line::from("+/-: Speed  x: Reset  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}

/// Get color style for a tile.
fn tile_style(tile: Tile) -> Style {
    match tile {
        Tile::Empty => Style::default(),
        Tile::Wall => Style::default().fg(Color::Gray),
        Tile::Block => Style::default().fg(Color::Magenta),
        Tile::Paddle => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Tile::Ball => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}
