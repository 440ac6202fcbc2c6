use std::str::FromStr;

/// Default number of cells, matching the usual Brainfuck convention.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Largest initial tape accepted from configuration (1 GiB of cells).
pub const MAX_TAPE_SIZE: usize = 1 << 30;

/// What happens when the data pointer moves past the last cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapePolicy {
    /// Append zeroed cells as needed.
    #[default]
    Growable,
    /// Moving past the last cell is an error.
    Bounded,
}

impl FromStr for TapePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "growable" | "grow" | "unbounded" => Ok(TapePolicy::Growable),
            "bounded" | "fixed" => Ok(TapePolicy::Bounded),
            other => Err(format!("unknown tape policy '{other}'")),
        }
    }
}

/// Returned by [`Tape`] operations that cannot complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeFault {
    Underflow,
    Overflow { ptr: usize, limit: usize },
    /// Memory for `cells` cells could not be allocated.
    Alloc { cells: usize },
}

/// Memory tape of `u8` cells with a single data pointer.
#[derive(Debug, Clone)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
    policy: TapePolicy,
}

/// Zeroed cells, failing instead of aborting when the allocation is refused.
fn zeroed(cells: usize) -> Result<Vec<u8>, TapeFault> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(cells)
        .map_err(|_| TapeFault::Alloc { cells })?;
    buf.resize(cells, 0);
    Ok(buf)
}

impl Tape {
    /// A zeroed tape of `size` cells. A size of 0 is treated as 1 so the
    /// pointer always has a cell under it.
    pub fn new(size: usize, policy: TapePolicy) -> Result<Self, TapeFault> {
        Ok(Self {
            cells: zeroed(size.max(1))?,
            pointer: 0,
            policy,
        })
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Current number of cells, including any added by growth.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`: a tape holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn policy(&self) -> TapePolicy {
        self.policy
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn increment(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.cells[self.pointer] = self.cells[self.pointer].wrapping_sub(1);
    }

    pub fn move_right(&mut self) -> Result<(), TapeFault> {
        let next = self.pointer + 1;
        if next >= self.cells.len() {
            match self.policy {
                TapePolicy::Growable => {
                    // Double so long runs to the right stay amortized O(1).
                    let grown = self.cells.len().saturating_mul(2).max(next + 1);
                    self.cells
                        .try_reserve_exact(grown - self.cells.len())
                        .map_err(|_| TapeFault::Alloc { cells: grown })?;
                    self.cells.resize(grown, 0);
                }
                TapePolicy::Bounded => {
                    return Err(TapeFault::Overflow {
                        ptr: self.pointer,
                        limit: self.cells.len(),
                    });
                }
            }
        }
        self.pointer = next;
        Ok(())
    }

    pub fn move_left(&mut self) -> Result<(), TapeFault> {
        if self.pointer == 0 {
            return Err(TapeFault::Underflow);
        }
        self.pointer -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_start_zeroed() {
        let tape = Tape::new(DEFAULT_TAPE_SIZE, TapePolicy::default()).unwrap();
        assert_eq!(tape.len(), DEFAULT_TAPE_SIZE);
        assert!(tape.cells().iter().all(|&c| c == 0));
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn wrapping_arithmetic() {
        let mut tape = Tape::new(1, TapePolicy::Bounded).unwrap();
        tape.decrement();
        assert_eq!(tape.get(), 255);
        tape.increment();
        assert_eq!(tape.get(), 0);
    }

    #[test]
    fn left_of_origin_underflows() {
        let mut tape = Tape::new(4, TapePolicy::Growable).unwrap();
        assert_eq!(tape.move_left(), Err(TapeFault::Underflow));
        assert_eq!(tape.pointer(), 0);
    }

    #[test]
    fn growable_tape_extends_with_zeroes() {
        let mut tape = Tape::new(2, TapePolicy::Growable).unwrap();
        tape.move_right().unwrap();
        tape.set(7);
        tape.move_right().unwrap();
        assert_eq!(tape.pointer(), 2);
        assert!(tape.len() >= 3);
        assert_eq!(tape.get(), 0);
        tape.move_left().unwrap();
        assert_eq!(tape.get(), 7);
    }

    #[test]
    fn bounded_tape_overflows_at_last_cell() {
        let mut tape = Tape::new(3, TapePolicy::Bounded).unwrap();
        tape.move_right().unwrap();
        tape.move_right().unwrap();
        assert_eq!(
            tape.move_right(),
            Err(TapeFault::Overflow { ptr: 2, limit: 3 })
        );
        assert_eq!(tape.pointer(), 2);
    }

    #[test]
    fn zero_size_still_has_a_cell() {
        let tape = Tape::new(0, TapePolicy::Bounded).unwrap();
        assert_eq!(tape.len(), 1);
        assert!(!tape.is_empty());
    }

    #[test]
    fn impossible_size_is_an_alloc_fault_not_a_panic() {
        let err = Tape::new(usize::MAX, TapePolicy::Growable).unwrap_err();
        assert_eq!(err, TapeFault::Alloc { cells: usize::MAX });
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!("Bounded".parse::<TapePolicy>(), Ok(TapePolicy::Bounded));
        assert_eq!(" grow ".parse::<TapePolicy>(), Ok(TapePolicy::Growable));
        assert!("sideways".parse::<TapePolicy>().is_err());
    }
}
