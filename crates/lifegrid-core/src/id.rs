//! Strongly-typed identifiers for workers, message tags and generations.

use std::fmt;

/// Identifies a worker within the cooperating set.
///
/// Ranks are dense: a set of `n` workers uses `Rank(0)..Rank(n)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl Rank {
    /// The rank directly before this one, or `None` for rank 0.
    pub fn prev(self) -> Option<Rank> {
        self.0.checked_sub(1).map(Rank)
    }

    /// The rank directly after this one.
    pub fn next(self) -> Rank {
        Rank(self.0 + 1)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Distinguishes the kinds of traffic exchanged between workers.
///
/// A receive names the tag it expects; a message arriving with any other
/// tag is an ordering violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    /// A single interior row sent to a strip neighbour (row-strip layout).
    HaloRow,
    /// An accumulated column bundle flowing east along a block row.
    ColumnBundle,
    /// A single interior column returned west along a block row.
    ReturnColumn,
    /// A full-width row exchanged between vertically adjacent blocks.
    BlockRow,
}

impl Tag {
    /// Numeric wire code for this tag.
    pub fn code(self) -> u8 {
        match self {
            Self::HaloRow => 15,
            Self::ColumnBundle => 14,
            Self::ReturnColumn => 16,
            Self::BlockRow => 17,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::HaloRow => "halo-row",
            Self::ColumnBundle => "column-bundle",
            Self::ReturnColumn => "return-column",
            Self::BlockRow => "block-row",
        };
        write!(f, "{name}({})", self.code())
    }
}

/// Monotonically increasing generation counter.
///
/// Generation `n` is the state after `n` applications of the rule.
/// Exported frames are numbered by the generation they show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The following generation.
    pub fn succ(self) -> Generation {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_neighbours() {
        assert_eq!(Rank(0).prev(), None);
        assert_eq!(Rank(3).prev(), Some(Rank(2)));
        assert_eq!(Rank(3).next(), Rank(4));
    }

    #[test]
    fn tag_codes_are_distinct() {
        let tags = [Tag::HaloRow, Tag::ColumnBundle, Tag::ReturnColumn, Tag::BlockRow];
        for (i, a) in tags.iter().enumerate() {
            for b in &tags[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a} and {b} share a wire code");
            }
        }
    }

    #[test]
    fn generation_display_and_succ() {
        let g = Generation::default();
        assert_eq!(g, Generation(0));
        assert_eq!(g.succ().to_string(), "1");
    }
}
