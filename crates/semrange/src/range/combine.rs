//! Outcome of combining two range pieces

use super::{Subrange, VersionComparer, VersionRange};

/// The result of intersecting, uniting or inverting comparers and subranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombineResult {
    /// No version at all
    Nothing,
    /// Every version
    Everything,
    OneComparer(VersionComparer),
    OneSubrange(Subrange),
    /// Two disjoint subranges, in range order
    TwoSubranges(Subrange, Subrange),
    /// The pieces cannot be expressed as one comparer or subrange and have to
    /// be kept apart
    Unrepresentable,
}

impl CombineResult {
    /// Convert the result into a normalized range
    ///
    /// Returns `None` for `Unrepresentable`.
    pub fn to_range(self) -> Option<VersionRange> {
        match self {
            CombineResult::Nothing => Some(VersionRange::nothing()),
            CombineResult::Everything => Some(VersionRange::everything()),
            CombineResult::OneComparer(comparer) => Some(VersionRange::from_comparer(comparer)),
            CombineResult::OneSubrange(subrange) => Some(VersionRange::from_subrange(subrange)),
            CombineResult::TwoSubranges(a, b) => Some(VersionRange::new(vec![a, b], None)),
            CombineResult::Unrepresentable => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, CombineResult::Nothing)
    }
}
