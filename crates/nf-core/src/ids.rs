use core::fmt;
use core::num::NonZeroU32;

/// Compact identifier for network objects.
///
/// Stored as index+1 so that `Option<Id>` costs nothing extra.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index.
    pub fn from_index(index: u32) -> Self {
        match NonZeroU32::new(index.wrapping_add(1)) {
            Some(v) => Self(v),
            None => panic!("Id index {index} overflows u32"),
        }
    }

    /// Create an Id from a `usize` position in a dense array.
    pub fn from_usize(index: usize) -> Self {
        let index = u32::try_from(index).unwrap_or_else(|_| panic!("Id index {index} overflows u32"));
        Self::from_index(index)
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The 0-based index as a `usize`, for slice access.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

pub type NodeId = Id;
pub type LinkId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_matches_creation_index() {
        for i in [0_usize, 1, 7, 4096] {
            assert_eq!(Id::from_usize(i).slot(), i);
        }
    }

    #[test]
    fn option_id_is_niche_packed() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }

    #[test]
    #[should_panic]
    fn max_index_panics() {
        let _ = Id::from_index(u32::MAX);
    }
}
