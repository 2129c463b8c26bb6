//! Error types for bfvm.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which side of a loop was left without a partner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bracket {
    Open,
    Close,
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bracket::Open => f.write_str("["),
            Bracket::Close => f.write_str("]"),
        }
    }
}

/// Errors that can occur while loading or running a program.
#[derive(Error, Debug)]
pub enum Error {
    /// A loop bracket has no matching partner inside the program.
    #[error("malformed program: unmatched '{bracket}' at byte {position}")]
    Malformed { bracket: Bracket, position: usize },

    /// The program file could not be read.
    #[error("failed to read program from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output sink failed, or the input source failed with something
    /// other than end of input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
