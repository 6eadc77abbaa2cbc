//! Identifier for source files taking part in a compilation.

use std::fmt;

/// Identifies one source file inside a compilation.
///
/// File `0` is reserved for the standard library so that the process-wide
/// parsed library keeps stable locations in every compilation that loads it.
///
/// # Example
///
/// ```
/// use cadl_core::SourceFileId;
///
/// let file = SourceFileId::new(3);
/// assert_eq!(file.index(), 3);
/// assert!(SourceFileId::STDLIB.is_stdlib());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceFileId(u32);

impl SourceFileId {
    /// The standard library file.
    pub const STDLIB: SourceFileId = SourceFileId(0);

    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_stdlib(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for SourceFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

impl From<u32> for SourceFileId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_id_display() {
        assert_eq!(format!("{}", SourceFileId::new(5)), "file_5");
    }

    #[test]
    fn only_zero_is_stdlib() {
        assert!(SourceFileId::new(0).is_stdlib());
        assert!(!SourceFileId::new(1).is_stdlib());
    }
}
