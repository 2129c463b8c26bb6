/// Default upper bound on the number of tape cells.
pub const DEFAULT_MAX_CELLS: usize = 300_000;

/// Outcome of a pointer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// The pointer moved within the existing cells.
    Moved,
    /// The pointer moved onto a freshly appended zero cell.
    Grew,
    /// The move would leave the tape bounds and was refused.
    Clamped,
}

/// A growable tape of byte cells with a single data pointer.
///
/// Starts as one zero cell. Grows upward one cell at a time, never shrinks,
/// and never exceeds `max_cells`. The pointer is always a valid index.
/// Cell arithmetic wraps modulo 256.
pub struct Tape {
    cells: Vec<u8>,
    ptr: usize,
    max_cells: usize,
}

impl Tape {
    /// Create a fresh tape. A bound of 0 is treated as 1.
    pub fn new(max_cells: usize) -> Self {
        Self {
            cells: vec![0u8],
            ptr: 0,
            max_cells: max_cells.max(1),
        }
    }

    #[inline(always)]
    pub fn move_right(&mut self) -> Move {
        if self.ptr == self.max_cells - 1 {
            return Move::Clamped;
        }
        let grew = self.ptr + 1 == self.cells.len();
        if grew {
            self.cells.push(0);
        }
        self.ptr += 1;
        if grew { Move::Grew } else { Move::Moved }
    }

    #[inline(always)]
    pub fn move_left(&mut self) -> Move {
        if self.ptr == 0 {
            return Move::Clamped;
        }
        self.ptr -= 1;
        Move::Moved
    }

    #[inline(always)]
    pub fn increment_cell(&mut self) {
        self.cells[self.ptr] = self.cells[self.ptr].wrapping_add(1);
    }

    #[inline(always)]
    pub fn decrement_cell(&mut self) {
        self.cells[self.ptr] = self.cells[self.ptr].wrapping_sub(1);
    }

    #[inline(always)]
    pub fn read_cell(&self) -> u8 {
        self.cells[self.ptr]
    }

    #[inline(always)]
    pub fn write_cell(&mut self, byte: u8) {
        self.cells[self.ptr] = byte;
    }

    pub fn pointer(&self) -> usize {
        self.ptr
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a tape holds at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CELLS)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn pointer_stays_in_bounds(
            moves in prop::collection::vec(any::<bool>(), 0..512),
            max_cells in 1usize..64
        ) {
            let mut tape = Tape::new(max_cells);
            let mut high_water = 0usize;
            for right in moves {
                if right { tape.move_right(); } else { tape.move_left(); }
                high_water = high_water.max(tape.pointer());
                prop_assert!(tape.pointer() < tape.len());
                prop_assert!(tape.pointer() <= max_cells - 1);
                prop_assert!(tape.len() <= high_water + 1);
            }
        }

        #[test]
        fn increment_then_decrement_restores(value in any::<u8>()) {
            let mut tape = Tape::new(1);
            tape.write_cell(value);
            tape.increment_cell();
            tape.decrement_cell();
            prop_assert_eq!(tape.read_cell(), value);
        }
    }
}
