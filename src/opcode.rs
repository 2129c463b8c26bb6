/// The eight-instruction alphabet.
///
/// Every other byte value is a comment: it is skipped by the dispatch loop
/// and never aborts execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// `>` move the data pointer right, growing the tape if needed.
    Right,
    /// `<` move the data pointer left, clamped at cell 0.
    Left,
    /// `+` increment the current cell (wrapping).
    Inc,
    /// `-` decrement the current cell (wrapping).
    Dec,
    /// `.` output the current cell.
    Output,
    /// `,` read one byte into the current cell.
    Input,
    /// `[` loop start.
    LoopStart,
    /// `]` loop end.
    LoopEnd,
}

pub const GREATER: u8 = b'>';
pub const LESS: u8 = b'<';
pub const PLUS: u8 = b'+';
pub const MINUS: u8 = b'-';
pub const DOT: u8 = b'.';
pub const COMMA: u8 = b',';
pub const LBRACKET: u8 = b'[';
pub const RBRACKET: u8 = b']';

impl Opcode {
    /// Decode a program byte. Returns `None` for comment bytes.
    #[inline(always)]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            GREATER => Some(Self::Right),
            LESS => Some(Self::Left),
            PLUS => Some(Self::Inc),
            MINUS => Some(Self::Dec),
            DOT => Some(Self::Output),
            COMMA => Some(Self::Input),
            LBRACKET => Some(Self::LoopStart),
            RBRACKET => Some(Self::LoopEnd),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Right => GREATER,
            Self::Left => LESS,
            Self::Inc => PLUS,
            Self::Dec => MINUS,
            Self::Output => DOT,
            Self::Input => COMMA,
            Self::LoopStart => LBRACKET,
            Self::LoopEnd => RBRACKET,
        }
    }

    /// Short mnemonic used in trace lines and step reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Right => "move_right",
            Self::Left => "move_left",
            Self::Inc => "increment_cell",
            Self::Dec => "decrement_cell",
            Self::Output => "output",
            Self::Input => "input",
            Self::LoopStart => "loop_start",
            Self::LoopEnd => "loop_end",
        }
    }
}

/// Returns true if the byte is one of the eight instructions.
pub fn is_instruction(byte: u8) -> bool {
    Opcode::from_byte(byte).is_some()
}

/// Render the instructions of `code` for human inspection.
///
/// Comment bytes are dropped. Each loop body goes on its own line, indented
/// two spaces per nesting level; runs of straight-line instructions stay on
/// one line. Unbalanced input still renders, with indentation saturating at
/// zero.
pub fn disassemble(code: &[u8]) -> String {
    let mut out = String::new();
    let mut line = String::new();
    let mut indent: usize = 0;

    let flush = |out: &mut String, line: &mut String, indent: usize| {
        if !line.is_empty() {
            out.push_str(&"  ".repeat(indent));
            out.push_str(line);
            out.push('\n');
            line.clear();
        }
    };

    for op in code.iter().filter_map(|&b| Opcode::from_byte(b)) {
        match op {
            Opcode::LoopStart => {
                flush(&mut out, &mut line, indent);
                out.push_str(&"  ".repeat(indent));
                out.push_str("[\n");
                indent += 1;
            }
            Opcode::LoopEnd => {
                flush(&mut out, &mut line, indent);
                indent = indent.saturating_sub(1);
                out.push_str(&"  ".repeat(indent));
                out.push_str("]\n");
            }
            other => line.push(other.as_byte() as char),
        }
    }
    flush(&mut out, &mut line, indent);

    out
}
