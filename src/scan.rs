//! Bracket matching by nested-depth scanning.
//!
//! Partners are found on demand by walking the program, never through a
//! precomputed jump table. Every scan counts depth from zero relative to its
//! own starting bracket, so nested pairs inside the scanned range cancel out
//! and the scan stops at the immediate partner. A scan that walks off either
//! end of the program reports the bracket it started from as malformed.

use crate::error::{Bracket, Error, Result};
use crate::opcode::{LBRACKET, RBRACKET};

/// Find the `]` matching the `[` at `start`.
///
/// A `start` that is out of range or not on a `[` is reported as malformed.
pub fn scan_forward(code: &[u8], start: usize) -> Result<usize> {
    if code.get(start) != Some(&LBRACKET) {
        return Err(Error::Malformed {
            bracket: Bracket::Open,
            position: start,
        });
    }
    let mut depth: usize = 0;
    for (pos, &byte) in code.iter().enumerate().skip(start) {
        match byte {
            LBRACKET => depth += 1,
            RBRACKET => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos);
                }
            }
            _ => {}
        }
    }
    Err(Error::Malformed {
        bracket: Bracket::Open,
        position: start,
    })
}

/// Find the `[` matching the `]` at `start`.
///
/// A `start` that is out of range or not on a `]` is reported as malformed.
pub fn scan_backward(code: &[u8], start: usize) -> Result<usize> {
    if code.get(start) != Some(&RBRACKET) {
        return Err(Error::Malformed {
            bracket: Bracket::Close,
            position: start,
        });
    }
    let mut depth: usize = 0;
    for pos in (0..=start).rev() {
        match code[pos] {
            RBRACKET => depth += 1,
            LBRACKET => {
                depth -= 1;
                if depth == 0 {
                    return Ok(pos);
                }
            }
            _ => {}
        }
    }
    Err(Error::Malformed {
        bracket: Bracket::Close,
        position: start,
    })
}

/// Check that every bracket in `code` has a partner.
///
/// Reports the first stray `]`, or else the earliest `[` left open.
pub fn validate(code: &[u8]) -> Result<()> {
    let mut open = Vec::new();
    for (pos, &byte) in code.iter().enumerate() {
        match byte {
            LBRACKET => open.push(pos),
            RBRACKET => {
                if open.pop().is_none() {
                    return Err(Error::Malformed {
                        bracket: Bracket::Close,
                        position: pos,
                    });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(Error::Malformed {
            bracket: Bracket::Open,
            position,
        }),
        None => Ok(()),
    }
}
