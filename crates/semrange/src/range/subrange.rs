//! A pair of bounds forming one interval, or the complement of one

use std::cmp::Ordering;
use std::fmt;

use super::{CombineResult, VersionComparer};
use crate::Version;

/// Two rays that either face each other or face away from each other
///
/// An inward subrange (`>=1.0.0 <2.0.0`) accepts versions matched by both
/// bounds. An outward subrange (`<1.0.0 || >=2.0.0`) accepts versions matched
/// by either bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subrange {
    lower: VersionComparer,
    upper: VersionComparer,
    is_inward: bool,
}

impl Subrange {
    /// Create a subrange from its two bounds
    ///
    /// # Panics
    ///
    /// Panics if a bound is exact, if `lower`'s version is above `upper`'s,
    /// or if the bounds face the wrong way for the interval they describe.
    pub fn new(lower: VersionComparer, upper: VersionComparer) -> Self {
        assert!(
            !lower.is_exact() && !upper.is_exact(),
            "subrange bounds must not be exact: {lower} {upper}"
        );
        assert!(
            lower.version() <= upper.version(),
            "subrange bounds are reversed: {lower} {upper}"
        );

        let is_inward = lower.matches(upper.version()) && upper.matches(lower.version());
        if is_inward {
            assert!(
                lower.is_upward() && upper.is_downward(),
                "inward subrange bounds must face each other: {lower} {upper}"
            );
        } else {
            assert!(
                lower.is_downward() && upper.is_upward(),
                "outward subrange bounds must face away: {lower} {upper}"
            );
        }

        Subrange {
            lower,
            upper,
            is_inward,
        }
    }

    /// The subrange holding exactly `version`
    pub fn exact(version: Version) -> Self {
        Subrange::new(
            VersionComparer::greater_or_equal(version.clone()),
            VersionComparer::less_or_equal(version),
        )
    }

    /// The outward subrange `<0.0.0 || >=0.0.0`, matching every version
    pub fn everything() -> Self {
        Subrange::new(
            VersionComparer::less(Version::ZERO),
            VersionComparer::greater_or_equal(Version::ZERO),
        )
    }

    pub fn lower(&self) -> &VersionComparer {
        &self.lower
    }

    pub fn upper(&self) -> &VersionComparer {
        &self.upper
    }

    pub fn is_inward(&self) -> bool {
        self.is_inward
    }

    /// Whether this subrange holds a single version
    pub fn is_exact(&self) -> bool {
        self.is_inward && self.lower.version() == self.upper.version()
    }

    pub fn matches(&self, version: &Version) -> bool {
        if self.is_inward {
            self.lower.matches(version) && self.upper.matches(version)
        } else {
            self.lower.matches(version) || self.upper.matches(version)
        }
    }

    /// The complement of this subrange
    pub fn invert(&self) -> CombineResult {
        let lower = self.lower.inverted_ray();
        let upper = self.upper.inverted_ray();
        if self.is_inward {
            lower.try_disjunction(&upper)
        } else {
            lower.try_conjunction(&upper)
        }
    }

    /// Two bounds that leave neither a gap nor an overlap between them
    pub fn test_exact_meeting(a: &VersionComparer, b: &VersionComparer) -> bool {
        !a.is_exact()
            && !b.is_exact()
            && a.version() == b.version()
            && a.is_upward() != b.is_upward()
            && a.is_inclusive() != b.is_inclusive()
    }

    /// Intersect two subranges
    pub fn try_conjunction(&self, other: &Subrange) -> CombineResult {
        match (self.is_inward, other.is_inward) {
            (true, true) => {
                let lower = self.lower.more_restrictive(&other.lower);
                let upper = self.upper.more_restrictive(&other.upper);
                lower.try_conjunction(upper)
            }
            (true, false) => self.conjunction_with_outward(other),
            (false, true) => other.conjunction_with_outward(self),
            (false, false) => {
                let low = self.lower.more_restrictive(&other.lower);
                let high = self.upper.more_restrictive(&other.upper);
                let ends = low.try_disjunction(high);

                let crossings = [
                    self.lower.try_conjunction(&other.upper),
                    other.lower.try_conjunction(&self.upper),
                ];
                crossings
                    .into_iter()
                    .filter_map(into_piece)
                    .fold(ends, join)
            }
        }
    }

    /// `self` inward, `outward` outward: the parts of `self` below and above
    /// the gap of `outward`
    fn conjunction_with_outward(&self, outward: &Subrange) -> CombineResult {
        debug_assert!(self.is_inward && !outward.is_inward);

        let below = self
            .lower
            .try_conjunction(self.upper.more_restrictive(&outward.lower));
        let above = self
            .lower
            .more_restrictive(&outward.upper)
            .try_conjunction(&self.upper);

        [below, above]
            .into_iter()
            .filter_map(into_piece)
            .fold(CombineResult::Nothing, join)
    }

    /// Unite two subranges
    pub fn try_disjunction(&self, other: &Subrange) -> CombineResult {
        match (self.is_inward, other.is_inward) {
            (true, true) => {
                let touching = !self.try_conjunction(other).is_nothing()
                    || Subrange::test_exact_meeting(&self.upper, &other.lower)
                    || Subrange::test_exact_meeting(&other.upper, &self.lower);
                if touching {
                    let lower = self.lower.less_restrictive(&other.lower).clone();
                    let upper = self.upper.less_restrictive(&other.upper).clone();
                    CombineResult::OneSubrange(Subrange::new(lower, upper))
                } else if self <= other {
                    CombineResult::TwoSubranges(self.clone(), other.clone())
                } else {
                    CombineResult::TwoSubranges(other.clone(), self.clone())
                }
            }
            (true, false) => self.disjunction_with_outward(other),
            (false, true) => other.disjunction_with_outward(self),
            (false, false) => {
                let low = self.lower.less_restrictive(&other.lower);
                let high = self.upper.less_restrictive(&other.upper);
                low.try_disjunction(high)
            }
        }
    }

    /// `self` inward, `outward` outward
    fn disjunction_with_outward(&self, outward: &Subrange) -> CombineResult {
        debug_assert!(self.is_inward && !outward.is_inward);

        let reaches_low = self.lower.try_disjunction(&outward.lower) == CombineResult::Everything;
        let reaches_high = outward.upper.try_disjunction(&self.upper) == CombineResult::Everything;

        match (reaches_low, reaches_high) {
            (true, true) => CombineResult::Everything,
            (true, false) => outward
                .lower
                .less_restrictive(&self.upper)
                .try_disjunction(&outward.upper),
            (false, true) => outward
                .lower
                .try_disjunction(outward.upper.less_restrictive(&self.lower)),
            (false, false) => CombineResult::TwoSubranges(outward.clone(), self.clone()),
        }
    }

    /// Fold a dangling comparer into this subrange
    ///
    /// Returns `OneComparer` when a ray swallows an inward subrange,
    /// `OneSubrange` or `Everything` when the pieces merge into one subrange,
    /// and `Unrepresentable` when both have to be kept.
    pub fn check_combine_with_comparer(&self, comparer: &VersionComparer) -> CombineResult {
        if comparer.is_exact() {
            return match self.try_disjunction(&Subrange::exact(comparer.version().clone())) {
                CombineResult::TwoSubranges(..) => CombineResult::Unrepresentable,
                other => other,
            };
        }

        if self.is_inward {
            let (near, far) = if comparer.is_downward() {
                (&self.lower, &self.upper)
            } else {
                (&self.upper, &self.lower)
            };
            if near.try_disjunction(comparer) == CombineResult::Everything {
                CombineResult::OneComparer(comparer.less_restrictive(far).clone())
            } else {
                CombineResult::Unrepresentable
            }
        } else if comparer.is_downward() {
            self.lower
                .less_restrictive(comparer)
                .try_disjunction(&self.upper)
        } else {
            self.lower
                .try_disjunction(self.upper.less_restrictive(comparer))
        }
    }
}

/// A subrange piece produced by intersecting two rays
fn into_piece(result: CombineResult) -> Option<Subrange> {
    match result {
        CombineResult::Nothing => None,
        CombineResult::OneSubrange(subrange) => Some(subrange),
        other => unreachable!("intersecting opposite rays produced {other:?}"),
    }
}

/// Add one more subrange to a union being accumulated
fn join(acc: CombineResult, piece: Subrange) -> CombineResult {
    match acc {
        CombineResult::Nothing => CombineResult::OneSubrange(piece),
        CombineResult::Everything => CombineResult::Everything,
        CombineResult::OneSubrange(subrange) => subrange.try_disjunction(&piece),
        other => unreachable!("cannot add a subrange to {other:?}"),
    }
}

impl Ord for Subrange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.is_inward
            .cmp(&other.is_inward)
            .then_with(|| self.lower.cmp(&other.lower))
            .then_with(|| self.upper.cmp(&other.upper))
    }
}

impl PartialOrd for Subrange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Subrange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_exact() {
            write!(f, "{}", self.lower.version())
        } else if self.is_inward {
            write!(f, "{} {}", self.lower, self.upper)
        } else if *self == Subrange::everything() {
            write!(f, "*")
        } else {
            write!(f, "{} || {}", self.lower, self.upper)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn inward(lower: &str, upper: &str) -> Subrange {
        Subrange::new(
            VersionComparer::greater_or_equal(v(lower)),
            VersionComparer::less(v(upper)),
        )
    }

    fn outward(lower: &str, upper: &str) -> Subrange {
        Subrange::new(
            VersionComparer::less(v(lower)),
            VersionComparer::greater_or_equal(v(upper)),
        )
    }

    fn one(result: CombineResult) -> Subrange {
        match result {
            CombineResult::OneSubrange(subrange) => subrange,
            other => panic!("expected one subrange, got {other:?}"),
        }
    }

    #[test]
    fn test_inward_is_derived() {
        assert!(inward("1.0.0", "2.0.0").is_inward());
        assert!(!outward("1.0.0", "2.0.0").is_inward());
        assert!(Subrange::exact(v("1.0.0")).is_inward());
        assert!(Subrange::exact(v("1.0.0")).is_exact());
    }

    #[test]
    #[should_panic]
    fn test_reversed_bounds_panic() {
        inward("2.0.0", "1.0.0");
    }

    #[test]
    #[should_panic]
    fn test_exact_bound_panics() {
        Subrange::new(VersionComparer::exact(v("1.0.0")), VersionComparer::less(v("2.0.0")));
    }

    #[test]
    fn test_matches() {
        let s = inward("1.0.0", "2.0.0");
        assert!(s.matches(&v("1.5.0")));
        assert!(!s.matches(&v("2.0.0")));
        let o = outward("1.0.0", "2.0.0");
        assert!(o.matches(&v("0.5.0")));
        assert!(o.matches(&v("2.0.0")));
        assert!(!o.matches(&v("1.5.0")));
        assert!(Subrange::everything().matches(&v("0.0.0-alpha")));
    }

    #[test]
    fn test_invert() {
        assert_eq!(one(inward("1.0.0", "2.0.0").invert()), outward("1.0.0", "2.0.0"));
        assert_eq!(one(outward("1.0.0", "2.0.0").invert()), inward("1.0.0", "2.0.0"));
        assert_eq!(Subrange::everything().invert(), CombineResult::Nothing);
    }

    #[test]
    fn test_exact_meeting() {
        let below = VersionComparer::less(v("2.0.0"));
        let above = VersionComparer::greater_or_equal(v("2.0.0"));
        assert!(Subrange::test_exact_meeting(&below, &above));
        assert!(!Subrange::test_exact_meeting(&below, &VersionComparer::greater(v("2.0.0"))));
        assert!(!Subrange::test_exact_meeting(&below, &VersionComparer::less_or_equal(v("2.0.0"))));
    }

    #[test]
    fn test_inward_conjunction() {
        let result = inward("1.0.0", "3.0.0").try_conjunction(&inward("2.0.0", "4.0.0"));
        assert_eq!(one(result), inward("2.0.0", "3.0.0"));
        let result = inward("1.0.0", "2.0.0").try_conjunction(&inward("2.0.0", "3.0.0"));
        assert_eq!(result, CombineResult::Nothing);
    }

    #[test]
    fn test_inward_disjunction() {
        let result = inward("1.0.0", "2.0.0").try_disjunction(&inward("2.0.0", "3.0.0"));
        assert_eq!(one(result), inward("1.0.0", "3.0.0"));

        let result = inward("3.0.0", "4.0.0").try_disjunction(&inward("1.0.0", "2.0.0"));
        assert_eq!(
            result,
            CombineResult::TwoSubranges(inward("1.0.0", "2.0.0"), inward("3.0.0", "4.0.0"))
        );
    }

    #[test]
    fn test_mixed_conjunction() {
        let gap = outward("2.0.0", "3.0.0");
        let result = inward("1.0.0", "4.0.0").try_conjunction(&gap);
        assert_eq!(
            result,
            CombineResult::TwoSubranges(inward("1.0.0", "2.0.0"), inward("3.0.0", "4.0.0"))
        );
        assert_eq!(inward("2.1.0", "2.5.0").try_conjunction(&gap), CombineResult::Nothing);
        assert_eq!(one(gap.try_conjunction(&inward("1.0.0", "2.5.0"))), inward("1.0.0", "2.0.0"));
    }

    #[test]
    fn test_mixed_disjunction() {
        let gap = outward("2.0.0", "3.0.0");
        assert_eq!(inward("1.0.0", "4.0.0").try_disjunction(&gap), CombineResult::Everything);
        assert_eq!(one(inward("1.0.0", "2.5.0").try_disjunction(&gap)), outward("2.5.0", "3.0.0"));
        assert_eq!(one(gap.try_disjunction(&inward("2.5.0", "4.0.0"))), outward("2.0.0", "2.5.0"));
        assert_eq!(one(inward("0.1.0", "0.2.0").try_disjunction(&gap)), gap);
        assert_eq!(
            inward("2.1.0", "2.2.0").try_disjunction(&gap),
            CombineResult::TwoSubranges(gap.clone(), inward("2.1.0", "2.2.0"))
        );
    }

    #[test]
    fn test_outward_pairs() {
        let a = outward("1.0.0", "5.0.0");
        let b = outward("3.0.0", "7.0.0");
        assert_eq!(one(a.try_disjunction(&b)), outward("3.0.0", "5.0.0"));
        assert_eq!(a.try_disjunction(&outward("6.0.0", "7.0.0")), CombineResult::Everything);
        assert_eq!(one(a.try_conjunction(&b)), outward("1.0.0", "7.0.0"));
        assert_eq!(
            a.try_conjunction(&outward("6.0.0", "8.0.0")),
            CombineResult::TwoSubranges(outward("1.0.0", "8.0.0"), inward("5.0.0", "6.0.0"))
        );
    }

    #[test]
    fn test_combine_with_comparer() {
        let s = inward("1.0.0", "3.0.0");
        let result = s.check_combine_with_comparer(&VersionComparer::less(v("2.0.0")));
        assert_eq!(result, CombineResult::OneComparer(VersionComparer::less(v("3.0.0"))));

        let result = s.check_combine_with_comparer(&VersionComparer::greater_or_equal(v("3.0.0")));
        assert_eq!(
            result,
            CombineResult::OneComparer(VersionComparer::greater_or_equal(v("1.0.0")))
        );

        let result = s.check_combine_with_comparer(&VersionComparer::greater(v("4.0.0")));
        assert_eq!(result, CombineResult::Unrepresentable);

        let result = s.check_combine_with_comparer(&VersionComparer::exact(v("3.0.0")));
        assert_eq!(
            one(result),
            Subrange::new(
                VersionComparer::greater_or_equal(v("1.0.0")),
                VersionComparer::less_or_equal(v("3.0.0"))
            )
        );

        let o = outward("1.0.0", "3.0.0");
        let result = o.check_combine_with_comparer(&VersionComparer::less(v("2.0.0")));
        assert_eq!(one(result), outward("2.0.0", "3.0.0"));
        let result = o.check_combine_with_comparer(&VersionComparer::greater_or_equal(v("1.0.0")));
        assert_eq!(result, CombineResult::Everything);
    }

    #[test]
    fn test_ordering_puts_outward_first() {
        let mut pieces = vec![inward("1.0.0", "2.0.0"), outward("3.0.0", "4.0.0"), inward("0.1.0", "0.2.0")];
        pieces.sort();
        assert!(!pieces[0].is_inward());
        assert_eq!(pieces[1], inward("0.1.0", "0.2.0"));
    }

    #[test]
    fn test_display() {
        assert_eq!(inward("1.0.0", "2.0.0").to_string(), ">=1.0.0 <2.0.0");
        assert_eq!(outward("1.0.0", "2.0.0").to_string(), "<1.0.0 || >=2.0.0");
        assert_eq!(Subrange::exact(v("1.2.3")).to_string(), "1.2.3");
        assert_eq!(Subrange::everything().to_string(), "*");
    }
}
