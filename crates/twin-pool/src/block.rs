//! Block records tracked by the ledger.

use std::fmt;

use twin_core::{BlockOffset, Power};

/// One contiguous span of the arena: `2^power` bytes starting at `offset`.
///
/// The buddy ("twin") of a block is not stored. It is the block at
/// `offset ^ 2^power`, which exists as a sibling for every block except
/// the whole-arena root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub(crate) offset: BlockOffset,
    pub(crate) power: Power,
    pub(crate) used: bool,
}

impl Block {
    pub(crate) fn new(offset: BlockOffset, power: Power, used: bool) -> Self {
        Self {
            offset,
            power,
            used,
        }
    }

    /// Start of the block within the arena.
    pub fn offset(&self) -> BlockOffset {
        self.offset
    }

    /// Size class of the block.
    pub fn power(&self) -> Power {
        self.power
    }

    /// Span of the block in bytes.
    pub fn span(&self) -> usize {
        self.power.bytes()
    }

    /// One past the last byte of the block.
    pub fn end(&self) -> usize {
        self.offset.0 + self.span()
    }

    /// Whether the block is currently handed out.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Offset of this block's buddy in an arena of `2^max_power` bytes.
    ///
    /// Returns `None` for the whole-arena block, which has no buddy.
    pub fn twin(&self, max_power: Power) -> Option<BlockOffset> {
        (self.power < max_power).then(|| self.offset.buddy(self.power))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block({}, {}, {})",
            self.offset,
            self.power,
            if self.used { "used" } else { "free" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_geometry() {
        let b = Block::new(BlockOffset(64), Power(5), true);
        assert_eq!(b.span(), 32);
        assert_eq!(b.end(), 96);
        assert!(b.is_used());
    }

    #[test]
    fn root_has_no_twin() {
        let root = Block::new(BlockOffset::ZERO, Power(10), false);
        assert_eq!(root.twin(Power(10)), None);
        let half = Block::new(BlockOffset(512), Power(9), false);
        assert_eq!(half.twin(Power(10)), Some(BlockOffset::ZERO));
    }

    #[test]
    fn display_shows_state() {
        let b = Block::new(BlockOffset(16), Power(4), false);
        assert_eq!(b.to_string(), "Block(0x10, 2^4, free)");
    }
}
