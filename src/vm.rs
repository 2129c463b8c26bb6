use std::io::{Bytes, Read, Write};

use tracing::{debug, trace};

use crate::error::Result;
use crate::opcode::Opcode;
use crate::program::Program;
use crate::scan;
use crate::tape::{DEFAULT_MAX_CELLS, Move, Tape};

/// Configuration for a single VM.
#[derive(Clone, Debug)]
pub struct VmConfig {
    /// Upper bound on tape cells; the pointer never moves past `max_cells - 1`.
    pub max_cells: usize,
    /// Trace every state-changing operation and collect `.` output in memory,
    /// writing it to the sink once when the run ends.
    pub verbose: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_cells: DEFAULT_MAX_CELLS,
            verbose: false,
        }
    }
}

/// State reported to the step hook after each recognized instruction.
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub opcode: Opcode,
    /// Program position of the instruction that just ran.
    pub position: usize,
    /// Program position that will be dispatched next.
    pub cursor: usize,
    pub pointer: usize,
    pub cell: u8,
    pub depth: usize,
}

/// Summary of a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Halted {
    /// Recognized instructions executed; comment bytes are not counted.
    pub instructions: usize,
    pub pointer: usize,
    pub tape_len: usize,
}

/// The virtual machine: one program, one tape, one cursor.
///
/// Loops are resolved by scanning the program for the partner bracket each
/// time a jump is needed. The program is bracket-balanced by construction,
/// but the scans still refuse to leave the program bounds.
pub struct Vm {
    program: Program,
    tape: Tape,
    cursor: usize,
    depth: usize,
    verbose: bool,
    buffer: Vec<u8>,
    instructions: usize,
}

impl Vm {
    pub fn new(program: Program, config: VmConfig) -> Self {
        Self {
            program,
            tape: Tape::new(config.max_cells),
            cursor: 0,
            depth: 0,
            verbose: config.verbose,
            buffer: Vec::new(),
            instructions: 0,
        }
    }

    /// Run until the cursor leaves the program.
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<Halted> {
        self.run_with_hook(input, output, |_| {})
    }

    /// Run until the cursor leaves the program, calling `on_step` after
    /// every recognized instruction.
    ///
    /// The hook observes state only; a hook that blocks (waiting for a
    /// keypress, say) pauses the run without changing its result.
    pub fn run_with_hook<R, W, F>(
        &mut self,
        input: R,
        mut output: W,
        on_step: F,
    ) -> Result<Halted>
    where
        R: Read,
        W: Write,
        F: FnMut(&Step),
    {
        let dispatched = self.dispatch(input, &mut output, on_step);

        // Buffered output reaches the sink even when the run stops on an error.
        let buffered = std::mem::take(&mut self.buffer);
        let flushed = output.write_all(&buffered).and_then(|()| output.flush());
        dispatched?;
        flushed?;

        debug!(
            instructions = self.instructions,
            pointer = self.tape.pointer(),
            tape_len = self.tape.len(),
            "program finished"
        );

        Ok(Halted {
            instructions: self.instructions,
            pointer: self.tape.pointer(),
            tape_len: self.tape.len(),
        })
    }

    fn dispatch<R, W, F>(&mut self, input: R, output: &mut W, mut on_step: F) -> Result<()>
    where
        R: Read,
        W: Write,
        F: FnMut(&Step),
    {
        let mut input = input.bytes();
        let len = self.program.len();

        while self.cursor < len {
            let position = self.cursor;
            let byte = self.program.code()[position];
            match Opcode::from_byte(byte) {
                Some(opcode) => {
                    self.execute(opcode, &mut input, output)?;
                    self.instructions += 1;
                    self.cursor += 1;
                    on_step(&Step {
                        opcode,
                        position,
                        cursor: self.cursor,
                        pointer: self.tape.pointer(),
                        cell: self.tape.read_cell(),
                        depth: self.depth,
                    });
                }
                None => self.cursor += 1,
            }
        }
        Ok(())
    }

    /// Execute one instruction. May reposition the cursor onto a loop
    /// partner; the caller still advances it by one afterwards.
    fn execute<R: Read, W: Write>(
        &mut self,
        opcode: Opcode,
        input: &mut Bytes<R>,
        output: &mut W,
    ) -> Result<()> {
        match opcode {
            Opcode::Right => {
                let moved = self.tape.move_right();
                match moved {
                    Move::Clamped => debug!(
                        at = self.cursor,
                        ptr = self.tape.pointer(),
                        max_cells = self.tape.max_cells(),
                        "move_right refused at tape bound"
                    ),
                    Move::Grew => debug!(len = self.tape.len(), "tape grew"),
                    Move::Moved => {}
                }
                if self.verbose && moved != Move::Clamped {
                    trace!(ptr = self.tape.pointer(), val = self.tape.read_cell(), "move_right");
                }
            }
            Opcode::Left => match self.tape.move_left() {
                Move::Clamped => debug!(at = self.cursor, "move_left attempted past start of tape"),
                _ => {
                    if self.verbose {
                        trace!(ptr = self.tape.pointer(), val = self.tape.read_cell(), "move_left");
                    }
                }
            },
            Opcode::Inc => {
                let old = self.tape.read_cell();
                self.tape.increment_cell();
                if self.verbose {
                    trace!(
                        cell = self.tape.pointer(),
                        from = old,
                        to = self.tape.read_cell(),
                        "increment_cell"
                    );
                }
            }
            Opcode::Dec => {
                let old = self.tape.read_cell();
                self.tape.decrement_cell();
                if self.verbose {
                    trace!(
                        cell = self.tape.pointer(),
                        from = old,
                        to = self.tape.read_cell(),
                        "decrement_cell"
                    );
                }
            }
            Opcode::Output => {
                let val = self.tape.read_cell();
                if self.verbose {
                    trace!(
                        cell = self.tape.pointer(),
                        val,
                        ascii = %(val as char).escape_default(),
                        "output"
                    );
                    self.buffer.push(val);
                } else {
                    output.write_all(&[val])?;
                }
            }
            Opcode::Input => match input.next() {
                Some(byte) => {
                    let val = byte?;
                    self.tape.write_cell(val);
                    if self.verbose {
                        trace!(cell = self.tape.pointer(), val, "input");
                    }
                }
                None => {
                    if self.verbose {
                        trace!(cell = self.tape.pointer(), "input exhausted, cell unchanged");
                    }
                }
            },
            Opcode::LoopStart => self.loop_start()?,
            Opcode::LoopEnd => self.loop_end()?,
        }
        Ok(())
    }

    fn loop_start(&mut self) -> Result<()> {
        let val = self.tape.read_cell();
        if val != 0 {
            self.depth += 1;
            if self.verbose {
                trace!(start = self.cursor, val, depth = self.depth, "loop_start: enter");
            }
            return Ok(());
        }
        // Park on the matching ']' so the caller's advance lands just past it.
        let start = self.cursor;
        self.cursor = scan::scan_forward(self.program.code(), start)?;
        if self.verbose {
            trace!(start, finish = self.cursor + 1, val, depth = self.depth, "loop_start: skip");
        }
        Ok(())
    }

    fn loop_end(&mut self) -> Result<()> {
        let val = self.tape.read_cell();
        if val == 0 {
            self.depth = self.depth.saturating_sub(1);
            if self.verbose {
                trace!(end = self.cursor, depth = self.depth, "loop_end: exit");
            }
            return Ok(());
        }
        // Park on the matching '['; the cell is known non-zero, so the body
        // re-runs from the instruction after it and the depth is unchanged.
        let end = self.cursor;
        self.cursor = scan::scan_backward(self.program.code(), end)?;
        if self.verbose {
            trace!(
                start = end,
                finish = self.cursor,
                val,
                depth = self.depth,
                "loop_end: jump back"
            );
        }
        Ok(())
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Loops currently entered and not yet exited.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn program(&self) -> &Program {
        &self.program
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    proptest! {
        #[test]
        fn loop_runs_cell_value_times(n in 1u8..=255) {
            let code = format!("{}[>+<-]", "+".repeat(n as usize));
            let mut vm = Vm::new(Program::new(code.as_str()).unwrap(), VmConfig::default());
            let mut bodies = 0usize;
            vm.run_with_hook(io::empty(), io::sink(), |s| {
                if s.opcode == Opcode::Right {
                    bodies += 1;
                }
            }).unwrap();
            prop_assert_eq!(bodies, n as usize);
            prop_assert_eq!(vm.tape().cells(), &[0, n][..]);
            prop_assert_eq!(vm.cursor(), code.len());
        }

        #[test]
        fn straight_line_programs_never_panic(
            code in prop::collection::vec(
                prop::sample::select(b"<>+-.,x ".to_vec()), 0..256
            ),
            input in prop::collection::vec(any::<u8>(), 0..16),
            max_cells in 1usize..16
        ) {
            let config = VmConfig { max_cells, verbose: false };
            let mut vm = Vm::new(Program::new(code.clone()).unwrap(), config);
            let halted = vm.run(&input[..], io::sink()).unwrap();
            prop_assert!(halted.pointer < max_cells);
            prop_assert!(halted.tape_len <= max_cells);
            prop_assert_eq!(vm.cursor(), code.len());
        }

        #[test]
        fn unbalanced_programs_are_rejected_before_running(
            prefix in "[+<>-]{0,8}",
            suffix in "[+<>-]{0,8}"
        ) {
            let code = format!("{prefix}[{suffix}");
            let err = Program::new(code.as_str()).unwrap_err();
            prop_assert!(err.is_malformed());
        }
    }
}
