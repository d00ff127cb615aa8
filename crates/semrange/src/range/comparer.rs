//! A single directional bound on versions

use std::cmp::Ordering;
use std::fmt;

use super::{CombineResult, ComparisonType, Subrange};
use crate::Version;

/// A version together with the side of it that is accepted
///
/// A comparer is either exact (`=v`) or a ray pointing up (`>v`, `>=v`) or
/// down (`<v`, `<=v`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionComparer {
    version: Version,
    kind: ComparisonType,
}

impl VersionComparer {
    /// Create a comparer
    ///
    /// A `PRE_RELEASE` flag on a ray over a release version moves the bound to
    /// that release's lowest prerelease, so `~<2.0.0` rejects `2.0.0-alpha`.
    /// The flag is ignored on exact comparers.
    ///
    /// # Panics
    ///
    /// Panics if `kind` has no direction, or points both up and down.
    pub fn new(version: Version, kind: ComparisonType) -> Self {
        let modifier = kind.contains(ComparisonType::PRE_RELEASE);
        let kind = kind.without(ComparisonType::PRE_RELEASE);
        assert!(!kind.is_empty(), "comparison type must not be empty");
        assert!(
            !kind.contains(ComparisonType::GREATER | ComparisonType::LESS),
            "comparison type cannot point both ways"
        );

        let version = if modifier && kind != ComparisonType::EXACT_EQUAL {
            version.prerelease_floor()
        } else {
            version
        };
        VersionComparer { version, kind }
    }

    pub fn exact(version: Version) -> Self {
        VersionComparer::new(version, ComparisonType::EXACT_EQUAL)
    }

    pub fn greater(version: Version) -> Self {
        VersionComparer::new(version, ComparisonType::GREATER)
    }

    pub fn greater_or_equal(version: Version) -> Self {
        VersionComparer::new(version, ComparisonType::GREATER_OR_EQUAL)
    }

    pub fn less(version: Version) -> Self {
        VersionComparer::new(version, ComparisonType::LESS)
    }

    pub fn less_or_equal(version: Version) -> Self {
        VersionComparer::new(version, ComparisonType::LESS_OR_EQUAL)
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn kind(&self) -> ComparisonType {
        self.kind
    }

    pub fn is_exact(&self) -> bool {
        self.kind == ComparisonType::EXACT_EQUAL
    }

    /// `>` or `>=`
    pub fn is_upward(&self) -> bool {
        self.kind.contains(ComparisonType::GREATER)
    }

    /// `<` or `<=`
    pub fn is_downward(&self) -> bool {
        self.kind.contains(ComparisonType::LESS)
    }

    pub fn is_inclusive(&self) -> bool {
        self.kind.contains(ComparisonType::EXACT_EQUAL)
    }

    /// Check whether `version` satisfies this comparer
    pub fn matches(&self, version: &Version) -> bool {
        match version.cmp(&self.version) {
            Ordering::Less => self.kind.contains(ComparisonType::LESS),
            Ordering::Equal => self.kind.contains(ComparisonType::EXACT_EQUAL),
            Ordering::Greater => self.kind.contains(ComparisonType::GREATER),
        }
    }

    /// Check whether this comparer's version satisfies `other`, or both are
    /// the same comparer
    pub fn matches_comparer(&self, other: &VersionComparer) -> bool {
        other.matches(&self.version) || self == other
    }

    /// Of two comparers facing the same way, the one accepting less
    pub(crate) fn more_restrictive<'a>(&'a self, other: &'a VersionComparer) -> &'a VersionComparer {
        debug_assert_eq!(self.is_upward(), other.is_upward());
        if self.matches_comparer(other) {
            self
        } else {
            other
        }
    }

    /// Of two comparers facing the same way, the one accepting more
    pub(crate) fn less_restrictive<'a>(&'a self, other: &'a VersionComparer) -> &'a VersionComparer {
        debug_assert_eq!(self.is_upward(), other.is_upward());
        if self.matches_comparer(other) {
            other
        } else {
            self
        }
    }

    /// The ray accepting exactly the versions this ray rejects
    pub(crate) fn inverted_ray(&self) -> VersionComparer {
        assert!(!self.is_exact(), "an exact comparer does not invert to a ray");
        VersionComparer {
            version: self.version.clone(),
            kind: self.kind.inverted(),
        }
    }

    /// The complement of this comparer
    pub fn invert(&self) -> CombineResult {
        if self.is_exact() {
            let below = VersionComparer::less(self.version.clone());
            let above = VersionComparer::greater(self.version.clone());
            return CombineResult::OneSubrange(Subrange::new(below, above));
        }
        CombineResult::OneComparer(self.inverted_ray())
    }

    /// Intersect two comparers
    ///
    /// The result is `OneComparer`, `OneSubrange` or `Nothing`.
    pub fn try_conjunction(&self, other: &VersionComparer) -> CombineResult {
        match (self.is_exact(), other.is_exact()) {
            (true, true) => {
                if self.version == other.version {
                    CombineResult::OneComparer(self.clone())
                } else {
                    CombineResult::Nothing
                }
            }
            (true, false) | (false, true) => {
                let (exact, ray) = if self.is_exact() { (self, other) } else { (other, self) };
                if ray.matches(&exact.version) {
                    CombineResult::OneComparer(exact.clone())
                } else {
                    CombineResult::Nothing
                }
            }
            (false, false) if self.is_upward() == other.is_upward() => {
                CombineResult::OneComparer(self.more_restrictive(other).clone())
            }
            (false, false) => {
                let (up, down) = if self.is_upward() { (self, other) } else { (other, self) };
                if up.matches(&down.version) && down.matches(&up.version) {
                    CombineResult::OneSubrange(Subrange::new(up.clone(), down.clone()))
                } else {
                    CombineResult::Nothing
                }
            }
        }
    }

    /// Unite two comparers
    ///
    /// The result is `OneComparer`, `OneSubrange`, `Everything`, or
    /// `Unrepresentable` when an exact version lies apart from the other
    /// comparer.
    pub fn try_disjunction(&self, other: &VersionComparer) -> CombineResult {
        match (self.is_exact(), other.is_exact()) {
            (true, true) => {
                if self.version == other.version {
                    CombineResult::OneComparer(self.clone())
                } else {
                    CombineResult::Unrepresentable
                }
            }
            (true, false) | (false, true) => {
                let (exact, ray) = if self.is_exact() { (self, other) } else { (other, self) };
                if ray.matches(&exact.version) {
                    CombineResult::OneComparer(ray.clone())
                } else if ray.version == exact.version {
                    CombineResult::OneComparer(VersionComparer {
                        version: ray.version.clone(),
                        kind: ray.kind | ComparisonType::EXACT_EQUAL,
                    })
                } else {
                    CombineResult::Unrepresentable
                }
            }
            (false, false) if self.is_upward() == other.is_upward() => {
                CombineResult::OneComparer(self.less_restrictive(other).clone())
            }
            (false, false) => {
                let (down, up) = if self.is_downward() { (self, other) } else { (other, self) };
                if up.matches_comparer(down) || down.matches_comparer(up) {
                    CombineResult::Everything
                } else {
                    CombineResult::OneSubrange(Subrange::new(down.clone(), up.clone()))
                }
            }
        }
    }

    /// Where the comparer's boundary sits relative to its version
    ///
    /// `<v` and `>=v` split just below `v`, `<=v` and `>v` just above it.
    fn boundary_rank(&self) -> u8 {
        if self.is_exact() {
            1
        } else if self.is_upward() != self.is_inclusive() {
            2
        } else {
            0
        }
    }
}

impl Ord for VersionComparer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.boundary_rank().cmp(&other.boundary_rank()))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for VersionComparer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionComparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.version)
    }
}
