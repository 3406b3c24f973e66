//! Intcode - CLI Entry Point
//!
//! Commands:
//! - `intcode run <program>` - Run a program with queued input
//! - `intcode arcade <program>` - Run a cabinet program headless and print the screen
//! - `intcode play <program>` - Watch a cabinet program in the terminal viewer
//! - `intcode disasm <program>` - Disassemble a program

use clap::{Parser, Subcommand, ValueEnum};
use intcode::vm::Summary;
use intcode::{HaltReason, InstructionSet, MachineError};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "intcode")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An Intcode virtual machine with an arcade cabinet peripheral")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the program file
        program: String,
        /// Input value, consumed in order (repeatable)
        #[arg(short, long = "input", allow_hyphen_values = true)]
        inputs: Vec<i64>,
        /// Patch memory before running, as ADDR=VALUE (repeatable)
        #[arg(long = "poke", value_parser = parse_poke)]
        pokes: Vec<(u64, i64)>,
        /// Instruction set to enable
        #[arg(long, value_enum, default_value_t = IsaArg::Relative)]
        isa: IsaArg,
        /// Maximum number of cycles to run
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Show trace output
        #[arg(short, long)]
        trace: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a cabinet program headless and print the final screen
    Arcade {
        /// Path to the cabinet program
        program: String,
        /// Start without quarters (patches address 0)
        #[arg(short, long)]
        free_play: bool,
        /// Maximum number of cycles to run
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Watch a cabinet program in the terminal viewer
    Play {
        /// Path to the cabinet program
        program: String,
        /// Start without quarters (patches address 0)
        #[arg(short, long)]
        free_play: bool,
    },
    /// Disassemble a program
    Disasm {
        /// Path to the program file
        program: String,
    },
    /// Run the built-in self-test
    Test,
}

#[derive(Clone, Copy, ValueEnum)]
enum IsaArg {
    /// Add, multiply, halt
    Arithmetic,
    /// Plus I/O, jumps and comparisons
    Io,
    /// Plus relative addressing
    Relative,
}

impl From<IsaArg> for InstructionSet {
    fn from(arg: IsaArg) -> Self {
        match arg {
            IsaArg::Arithmetic => InstructionSet::Arithmetic,
            IsaArg::Io => InstructionSet::Io,
            IsaArg::Relative => InstructionSet::Relative,
        }
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    machine: Summary,
    outputs: &'a [i64],
}

#[derive(Serialize)]
struct ArcadeReport {
    machine: Summary,
    score: i64,
    blocks: usize,
    moves: u64,
}

fn parse_poke(s: &str) -> Result<(u64, i64), String> {
    let (addr, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, got {:?}", s))?;
    let addr = addr.trim().parse::<u64>().map_err(|e| format!("bad address {:?}: {}", addr, e))?;
    let value = value.trim().parse::<i64>().map_err(|e| format!("bad value {:?}: {}", value, e))?;
    Ok((addr, value))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { program, inputs, pokes, isa, max_cycles, trace, json }) => {
            run_program(&program, inputs, &pokes, isa.into(), max_cycles, trace, json);
        }
        Some(Commands::Arcade { program, free_play, max_cycles, json }) => {
            run_arcade(&program, free_play, max_cycles, json);
        }
        Some(Commands::Play { program, free_play }) => {
            play_arcade(&program, free_play);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("Intcode v0.1.0");
            println!("An Intcode virtual machine with an arcade cabinet peripheral");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn load_or_exit(path: &str) -> Vec<i64> {
    match intcode::load_program(path) {
        Ok(program) => {
            log::info!("loaded {} words from {}", program.len(), path);
            program
        }
        Err(e) => {
            eprintln!("❌ Failed to load program: {}", e);
            std::process::exit(1);
        }
    }
}

fn report_halt(reason: Option<HaltReason>, max_cycles: Option<u64>) {
    match reason {
        Some(HaltReason::Halt) => {}
        Some(HaltReason::UnknownOpcode { pc, word }) => {
            log::warn!("unknown opcode {} at pc {}, machine halted", word, pc);
        }
        None => {
            eprintln!(
                "⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.",
                max_cycles.unwrap_or_default()
            );
        }
    }
}

fn exit_on_error(e: MachineError) -> ! {
    eprintln!("❌ Machine error: {}", e);
    std::process::exit(1);
}

fn run_program(
    path: &str,
    inputs: Vec<i64>,
    pokes: &[(u64, i64)],
    isa: InstructionSet,
    max_cycles: Option<u64>,
    trace: bool,
    json: bool,
) {
    use intcode::{BufferedIo, Machine, Step};
    use intcode::program::disasm::disassemble_at;

    let program = load_or_exit(path);

    let mut machine = Machine::with_peripheral(&program, BufferedIo::with_inputs(inputs))
        .with_instruction_set(isa);
    for &(addr, value) in pokes {
        machine.poke(addr, value);
    }

    // Step manually so the trace and the cycle budget share one loop
    let mut reason = None;
    while machine.is_running() && max_cycles.map_or(true, |max| machine.cycles() < max) {
        let pc = machine.pc();
        let line = trace.then(|| disassemble_at(machine.memory(), pc).0);

        match machine.step() {
            Ok(step) => {
                if let Some(line) = line {
                    println!("{:05}: {:<28} base={}", pc, line, machine.relative_base());
                }
                if let Step::Halted(r) = step {
                    reason = Some(r);
                }
            }
            Err(e) => exit_on_error(e),
        }
    }
    report_halt(reason, max_cycles);

    let outputs = machine.peripheral().outputs();
    if json {
        let report = RunReport { machine: machine.summary(), outputs };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("❌ Failed to encode report: {}", e),
        }
        return;
    }

    for value in outputs {
        println!("{}", value);
    }
    log::info!(
        "{} cycles, pc {}, relative base {}, address 0 = {}",
        machine.cycles(), machine.pc(), machine.relative_base(), machine.peek(0)
    );
}

fn run_arcade(path: &str, free_play: bool, max_cycles: Option<u64>, json: bool) {
    use intcode::{Arcade, Tile};

    let program = load_or_exit(path);
    let mut machine = Arcade::boot(&program, free_play);

    let result = match max_cycles {
        Some(max) => machine.run_limited(max),
        None => machine.run().map(Some),
    };
    match result {
        Ok(reason) => report_halt(reason, max_cycles),
        Err(e) => exit_on_error(e),
    }

    let arcade = machine.peripheral();
    let screen = arcade.screen();
    if json {
        let report = ArcadeReport {
            machine: machine.summary(),
            score: screen.score(),
            blocks: screen.count(Tile::Block),
            moves: arcade.moves(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("❌ Failed to encode report: {}", e),
        }
        return;
    }

    print!("{}", screen.render());
    println!("Blocks: {}", screen.count(Tile::Block));
}

#[cfg(feature = "tui")]
fn play_arcade(path: &str, free_play: bool) {
    let program = load_or_exit(path);

    if let Err(e) = intcode::run_viewer(&program, free_play) {
        eprintln!("❌ Viewer error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn play_arcade(_path: &str, _free_play: bool) {
    eprintln!("❌ Built without the `tui` feature; use `intcode arcade` instead");
    std::process::exit(1);
}

fn disassemble_file(path: &str) {
    let program = load_or_exit(path);
    print!("{}", intcode::disassemble(&program));
}

fn run_self_test() {
    use intcode::{decode, Arcade, BufferedIo, Machine, Opcode, ParamMode, Peripheral};

    println!("━━━ Intcode Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };

    // Test 1: Decoder
    let decoded = decode(1002);
    check(
        "Decode 1002",
        matches!(decoded, Ok(instr) if instr.opcode == Opcode::Multiply
            && instr.modes == [ParamMode::Position, ParamMode::Immediate, ParamMode::Position]),
    );

    // Test 2: Arithmetic
    let mut machine = Machine::new(&[1002, 4, 3, 4, 33]);
    let ok = machine.run().is_ok() && machine.peek(4) == 99;
    check("Multiply with immediate operand", ok);

    // Test 3: Relative mode quine
    let quine = [109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99];
    let mut machine = Machine::with_peripheral(&quine, BufferedIo::new());
    let ok = machine.run().is_ok() && machine.peripheral().outputs() == quine;
    check("Relative-mode quine", ok);

    // Test 4: Comparison with input
    let mut machine = Machine::with_peripheral(&[3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8], BufferedIo::with_inputs([8]));
    let ok = machine.run().is_ok() && machine.peripheral().last_output() == Some(1);
    check("Input equals 8", ok);

    // Test 5: Fail-soft halt
    let mut machine = Machine::new(&[77]);
    let ok = matches!(machine.run(), Ok(HaltReason::UnknownOpcode { pc: 0, word: 77 }));
    check("Unknown opcode halts", ok);

    // Test 6: Arcade control
    let mut arcade = Arcade::new();
    for value in [10, 20, 3, 12, 19, 4] {
        arcade.emit_output(value);
    }
    check("Arcade tracks ball", arcade.request_input() == Ok(1));

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
