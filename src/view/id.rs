//! Generational view handles.

use std::fmt;

/// Generational handle to a view stored in a [`crate::view::ViewTree`].
///
/// A slot reused after destruction gets a new generation, so a stale id never resolves to
/// a different view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ViewId {
    pub(crate) fn new(idx: u32, generation: u32) -> Self {
        Self { idx, generation }
    }

    /// Arena slot index.
    pub fn index(self) -> u32 {
        self.idx
    }

    /// Generation of the slot at the time this id was handed out.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.idx, self.generation)
    }
}
