use serde::{Deserialize, Serialize};

/// A range of offsets `[from, to)` into the linear data.
///
/// `from` may be greater than `to`; such a range is *backwards* (a selection
/// made right-to-left). [`Range::start`] and [`Range::end`] always give the
/// normalized bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub from: usize,
    pub to: usize,
}

impl Range {
    #[must_use]
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// A zero-length range at `offset`.
    #[must_use]
    pub fn collapsed(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    #[must_use]
    pub fn start(self) -> usize {
        self.from.min(self.to)
    }

    #[must_use]
    pub fn end(self) -> usize {
        self.from.max(self.to)
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end() - self.start()
    }

    #[must_use]
    pub fn is_collapsed(self) -> bool {
        self.from == self.to
    }

    #[must_use]
    pub fn is_backwards(self) -> bool {
        self.from > self.to
    }

    /// The same range with its direction reversed.
    #[must_use]
    pub fn flip(self) -> Self {
        Self::new(self.to, self.from)
    }

    /// The forwards version of this range.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.start(), self.end())
    }

    #[must_use]
    pub fn contains_offset(self, offset: usize) -> bool {
        offset >= self.start() && offset < self.end()
    }

    #[must_use]
    pub fn as_std(self) -> std::ops::Range<usize> {
        self.start()..self.end()
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}
