use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use bfvm::opcode::disassemble;
use bfvm::tape::DEFAULT_MAX_CELLS;
use bfvm::{Program, Step, Vm, VmConfig};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bfvm",
    version,
    about = "Byte-tape virtual machine for the eight-instruction language"
)]
struct Cli {
    /// Program file to run. Without it, the first line of stdin is the program.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Trace every operation and print program output once at the end.
    #[arg(short, long)]
    verbose: bool,

    /// Single-step: wait for Enter after every instruction.
    #[arg(short, long)]
    debug: bool,

    /// Maximum number of tape cells.
    #[arg(long, default_value_t = DEFAULT_MAX_CELLS)]
    max_cells: usize,

    /// Print the instruction listing and exit without running.
    #[arg(long)]
    disassemble: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "trace" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> bfvm::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let program = match &cli.file {
        Some(path) => Program::from_file(path)?,
        None => Program::from_line(&mut input)?,
    };

    if cli.disassemble {
        println!("; {} instructions", program.instruction_count());
        print!("{}", disassemble(program.code()));
        return Ok(());
    }

    let config = VmConfig {
        max_cells: cli.max_cells,
        verbose: cli.verbose,
    };
    let mut vm = Vm::new(program, config);
    let stdout = io::stdout();
    let output = stdout.lock();

    let halted = if cli.debug {
        let mut pause = Pause::open();
        vm.run_with_hook(input, output, |step| pause.wait(step))?
    } else {
        vm.run(input, output)?
    };

    if cli.verbose {
        println!();
        eprintln!(
            "halted after {} instructions ({} in program) [ptr: {}] [tape: {}]",
            halted.instructions,
            vm.program().instruction_count(),
            halted.pointer,
            halted.tape_len
        );
    }
    Ok(())
}

/// Blocks after each step until Enter is pressed on the controlling terminal.
///
/// Reads from the terminal rather than stdin, which belongs to the program.
struct Pause {
    tty: Option<BufReader<File>>,
}

impl Pause {
    fn open() -> Self {
        let tty = match File::open("/dev/tty") {
            Ok(f) => Some(BufReader::new(f)),
            Err(e) => {
                warn!("single-step disabled, no terminal: {e}");
                None
            }
        };
        Self { tty }
    }

    fn wait(&mut self, step: &Step) {
        let Some(tty) = self.tty.as_mut() else {
            return;
        };
        eprint!(
            "{:>6} {:<14} [ptr: {}] [val: {}] [depth: {}] ",
            step.position,
            step.opcode.name(),
            step.pointer,
            step.cell,
            step.depth
        );
        if let Err(e) = io::stderr().flush() {
            warn!("single-step disabled, cannot prompt: {e}");
            self.tty = None;
            return;
        }
        let mut line = String::new();
        if let Err(e) = tty.read_line(&mut line) {
            warn!("single-step disabled, terminal read failed: {e}");
            self.tty = None;
        }
    }
}
