pub mod error;
pub mod opcode;
pub mod tape;
pub mod scan;
pub mod program;
pub mod vm;

pub use error::{Error, Result};
pub use program::Program;
pub use vm::{Halted, Step, Vm, VmConfig};
