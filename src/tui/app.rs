//! Arcade viewer application state and logic.

use crate::arcade::Arcade;
use crate::vm::{Machine, MachineState, Step};
use crate::program::disasm::disassemble_at;

/// Instructions executed per frame at speed 1.
const BASE_STEPS_PER_TICK: u64 = 500;

/// Highest speed multiplier.
const MAX_SPEED: u64 = 64;

/// Viewer application state.
pub struct ViewerApp {
    /// The machine running the cabinet program.
    pub machine: Machine<Arcade>,
    /// Start new games in free-play mode.
    pub free_play: bool,
    /// Is the machine running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Speed multiplier for continuous running.
    pub speed: u64,
}

impl ViewerApp {
    /// Create a viewer with a freshly booted cabinet.
    pub fn new(program: &[i64], free_play: bool) -> Self {
        Self {
            machine: Arcade::boot(program, free_play),
            free_play,
            running: false,
            should_quit: false,
            status: "Ready. Press 'r' to run, 's' to step, 'q' to quit.".into(),
            speed: 1,
        }
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.machine.is_running() {
            self.status = format!("Machine stopped: {:?}", self.machine.state());
            self.running = false;
            return;
        }

        let pc = self.machine.pc();
        let (disasm, _) = disassemble_at(self.machine.memory(), pc);
        match self.machine.step() {
            Ok(Step::Executed(_)) => {
                self.status = format!("PC={:05}: {}", pc, disasm);
            }
            Ok(Step::Halted(reason)) => {
                self.status = format!("Halted ({:?}), final score {}", reason, self.score());
                self.running = false;
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run continuously until halt or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one frame of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        match self.machine.run_limited(BASE_STEPS_PER_TICK * self.speed) {
            Ok(Some(reason)) => {
                self.running = false;
                self.status = format!(
                    "Halted ({:?}) after {} cycles, final score {}",
                    reason, self.machine.cycles(), self.score()
                );
            }
            Ok(None) => {}
            Err(e) => {
                self.running = false;
                self.status = format!("Error: {}", e);
            }
        }
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed * 2).min(MAX_SPEED);
        self.status = format!("Speed x{}", self.speed);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed / 2).max(1);
        self.status = format!("Speed x{}", self.speed);
    }

    /// Boot a fresh cabinet with the same program.
    pub fn reset(&mut self) {
        let program = self.machine.program().to_vec();
        self.machine = Arcade::boot(&program, self.free_play);
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    pub fn score(&self) -> i64 {
        self.machine.peripheral().screen().score()
    }

    pub fn is_finished(&self) -> bool {
        self.machine.state() != MachineState::Running
    }
}

/// Run the viewer with a cabinet program.
pub fn run_viewer(program: &[i64], free_play: bool) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = ViewerApp::new(program, free_play);

    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Char('+') | KeyCode::Up => app.faster(),
                        KeyCode::Char('-') | KeyCode::Down => app.slower(),
                        _ => {}
                    }
                }
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
