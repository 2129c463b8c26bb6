use std::io::BufRead;
use std::path::Path;

use crate::error::{Error, Result};
use crate::opcode::is_instruction;
use crate::scan;

/// An immutable, bracket-balanced program.
///
/// Balance is checked once when the program is built, so a lone `[` or a
/// stray `]` is rejected before any instruction runs.
#[derive(Clone, Debug)]
pub struct Program {
    code: Vec<u8>,
}

impl Program {
    pub fn new(code: impl Into<Vec<u8>>) -> Result<Self> {
        let code = code.into();
        scan::validate(&code)?;
        Ok(Self { code })
    }

    /// Read a whole file as the program.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let code = std::fs::read(path).map_err(|source| Error::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(code)
    }

    /// Read one line as the program, without its `\n` or `\r\n` terminator.
    ///
    /// Only the first line is consumed; whatever follows stays in `reader`
    /// and can serve as input for `,`.
    pub fn from_line<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line)?;
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Self::new(line)
    }

    pub fn code(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Number of bytes that are instructions rather than comments.
    pub fn instruction_count(&self) -> usize {
        self.code.iter().filter(|&&b| is_instruction(b)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};

    #[test]
    fn test_rejects_lone_open() {
        let err = Program::new(&b"["[..]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_accepts_comments() {
        let program = Program::new("add: ++ [ - ] done").unwrap();
        assert_eq!(program.len(), 18);
        assert_eq!(program.instruction_count(), 5);
    }

    #[test]
    fn test_from_line_strips_terminator() {
        let mut input = Cursor::new(b"+[-]\nAB".to_vec());
        let program = Program::from_line(&mut input).unwrap();
        assert_eq!(program.code(), b"+[-]");
        // The rest of the stream is left for the input instruction.
        let mut rest = Vec::new();
        input.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"AB");
    }

    #[test]
    fn test_from_line_strips_crlf() {
        let mut input = Cursor::new(b",.\r\n".to_vec());
        assert_eq!(Program::from_line(&mut input).unwrap().code(), b",.");
    }

    #[test]
    fn test_from_line_without_newline() {
        let mut input = Cursor::new(b"+++".to_vec());
        assert_eq!(Program::from_line(&mut input).unwrap().code(), b"+++");
    }

    #[test]
    fn test_from_line_empty_input() {
        let mut input = Cursor::new(Vec::new());
        assert!(Program::from_line(&mut input).unwrap().is_empty());
    }

    #[test]
    fn test_from_file_missing() {
        let err = Program::from_file("/nonexistent/bfvm/program.bf").unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn test_from_file_reads_whole_file() {
        let path = std::env::temp_dir().join(format!("bfvm-{}.bf", std::process::id()));
        std::fs::write(&path, b"++\n>+\n").unwrap();
        let program = Program::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(program.code(), b"++\n>+\n");
    }
}
