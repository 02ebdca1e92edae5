//! Outer-totalistic update rules over the 8-cell Moore neighbourhood.

use std::fmt;

/// Birth/survival rule indexed by live-neighbour count (`0..=8`).
///
/// Chosen once when a [`Grid`](crate::Grid) is built. Every driver in
/// this workspace uses [`Rule::CONWAY`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    birth: u16,
    survival: u16,
}

impl Rule {
    /// Standard Life, B3/S23.
    pub const CONWAY: Rule = Rule {
        birth: 1 << 3,
        survival: (1 << 2) | (1 << 3),
    };

    /// Build a rule from bit masks: bit `n` set means "`n` live neighbours
    /// causes birth" (resp. survival). Bits above 8 are ignored.
    pub fn from_masks(birth: u16, survival: u16) -> Self {
        Self {
            birth: birth & 0x1ff,
            survival: survival & 0x1ff,
        }
    }

    /// State of a cell next generation, given its current state and its
    /// live-neighbour count.
    #[inline]
    pub fn next_state(&self, alive: bool, neighbours: u8) -> bool {
        let mask = if alive { self.survival } else { self.birth };
        neighbours <= 8 && mask & (1 << neighbours) != 0
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self::CONWAY
    }
}

impl fmt::Display for Rule {
    /// Renders in `B3/S23` notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("B")?;
        for n in 0..=8 {
            if self.birth & (1 << n) != 0 {
                write!(f, "{n}")?;
            }
        }
        f.write_str("/S")?;
        for n in 0..=8 {
            if self.survival & (1 << n) != 0 {
                write!(f, "{n}")?;
            }
        }
        Ok(())
    }
}
