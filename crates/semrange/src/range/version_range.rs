//! Normalized unions of subranges

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;
use std::sync::OnceLock;

use lazy_static::lazy_static;

use super::{CombineResult, Subrange, VersionComparer};
use crate::diagnostics::{self, Grammar};
use crate::error::ParseError;
use crate::parser::{self, ParseContext};
use crate::Version;

lazy_static! {
    static ref EVERYTHING: VersionRange = VersionRange::raw(vec![Subrange::everything()], None);
    static ref NOTHING: VersionRange = VersionRange::raw(Vec::new(), None);
}

/// A set of versions in canonical form
///
/// The set is stored as sorted, disjoint, non-touching subranges (an outward
/// one first, if any) plus at most one dangling ray. Two ranges holding the
/// same versions compare equal.
#[derive(Clone)]
pub struct VersionRange {
    subranges: Vec<Subrange>,
    additional: Option<VersionComparer>,
    inverse: OnceLock<Box<VersionRange>>,
}

impl VersionRange {
    fn raw(subranges: Vec<Subrange>, additional: Option<VersionComparer>) -> Self {
        VersionRange {
            subranges,
            additional,
            inverse: OnceLock::new(),
        }
    }

    /// Build a range from arbitrary pieces, normalizing them
    pub fn new(subranges: Vec<Subrange>, additional: Option<VersionComparer>) -> Self {
        fixup(subranges, additional)
    }

    /// The range matching every version
    pub fn everything() -> Self {
        EVERYTHING.clone()
    }

    /// The range matching no version
    pub fn nothing() -> Self {
        NOTHING.clone()
    }

    /// The range matching exactly `version`
    pub fn for_version(version: Version) -> Self {
        Self::from_subrange(Subrange::exact(version))
    }

    pub fn from_subrange(subrange: Subrange) -> Self {
        fixup(vec![subrange], None)
    }

    pub fn from_comparer(comparer: VersionComparer) -> Self {
        fixup(Vec::new(), Some(comparer))
    }

    /// Parse a range, producing a diagnostic report on failure
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        Self::try_parse(text).ok_or_else(|| {
            log::debug!("Could not parse version range {:?}, building report", text);
            ParseError::InvalidRange {
                input: text.to_string(),
                report: diagnostics::build_report(text, Grammar::Range),
            }
        })
    }

    /// Parse a range, returning `None` on failure
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::try_parse_with(text, &mut ParseContext::silent())
    }

    /// Parse a range, recording parse actions into `context`
    pub fn try_parse_with(text: &str, context: &mut ParseContext) -> Option<Self> {
        parser::parse_complete_range(text.trim(), context)
    }

    pub fn subranges(&self) -> &[Subrange] {
        &self.subranges
    }

    /// The unbounded ray not merged into any subrange
    pub fn additional_comparer(&self) -> Option<&VersionComparer> {
        self.additional.as_ref()
    }

    pub fn is_everything(&self) -> bool {
        *self == *EVERYTHING
    }

    pub fn is_nothing(&self) -> bool {
        self.subranges.is_empty() && self.additional.is_none()
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.additional.as_ref().is_some_and(|c| c.matches(version))
            || self.subranges.iter().any(|s| s.matches(version))
    }

    /// The union of two ranges
    pub fn disjunction(&self, other: &VersionRange) -> VersionRange {
        if self.is_everything() || other.is_nothing() {
            return self.clone();
        }
        if other.is_everything() || self.is_nothing() {
            return other.clone();
        }

        let mut subranges: Vec<Subrange> = self
            .subranges
            .iter()
            .chain(other.subranges.iter())
            .cloned()
            .collect();

        let additional = match (&self.additional, &other.additional) {
            (Some(a), Some(b)) => match a.try_disjunction(b) {
                CombineResult::OneComparer(comparer) => Some(comparer),
                CombineResult::OneSubrange(subrange) => {
                    subranges.push(subrange);
                    None
                }
                CombineResult::Everything => return VersionRange::everything(),
                CombineResult::Unrepresentable => {
                    let (exact, ray) = if a.is_exact() { (a, b) } else { (b, a) };
                    subranges.push(Subrange::exact(exact.version().clone()));
                    Some(ray.clone())
                }
                other => unreachable!("comparer union produced {other:?}"),
            },
            (a, b) => a.as_ref().or(b.as_ref()).cloned(),
        };

        fixup(subranges, additional)
    }

    /// The intersection of two ranges
    pub fn conjunction(&self, other: &VersionRange) -> VersionRange {
        if self.is_nothing() || other.is_everything() {
            return self.clone();
        }
        if other.is_nothing() || self.is_everything() {
            return other.clone();
        }
        self.invert().disjunction(&other.invert()).invert()
    }

    /// The range matching exactly the versions this one does not
    ///
    /// The result is computed once and remembers this range as its own
    /// inverse.
    pub fn invert(&self) -> VersionRange {
        let inverse = self.inverse.get_or_init(|| {
            let inverse = self.compute_inverse();
            let _ = inverse.inverse.set(Box::new(self.without_cache()));
            Box::new(inverse)
        });
        (**inverse).clone()
    }

    fn without_cache(&self) -> VersionRange {
        VersionRange::raw(self.subranges.clone(), self.additional.clone())
    }

    /// Walk the gaps between the pieces of this range
    fn compute_inverse(&self) -> VersionRange {
        if self.is_nothing() {
            return VersionRange::everything();
        }
        if self.is_everything() {
            return VersionRange::nothing();
        }

        let (outward, inward) = match self.subranges.first() {
            Some(first) if !first.is_inward() => (Some(first), &self.subranges[1..]),
            _ => (None, &self.subranges[..]),
        };

        // Rays closing the complement from below and above; `None` is unbounded
        let (mut start, end) = match (outward, &self.additional) {
            (Some(outward), _) => (
                Some(outward.lower().inverted_ray()),
                Some(outward.upper().inverted_ray()),
            ),
            (None, Some(comparer)) if comparer.is_downward() => (Some(comparer.inverted_ray()), None),
            (None, Some(comparer)) => (None, Some(comparer.inverted_ray())),
            (None, None) => (None, None),
        };

        let mut pieces = Vec::new();
        let mut below = None;
        for subrange in inward {
            let close = subrange.lower().inverted_ray();
            match start.take() {
                Some(open) => pieces.extend(gap_piece(open.try_conjunction(&close))),
                None => below = Some(close),
            }
            start = Some(subrange.upper().inverted_ray());
        }

        let mut above = None;
        match (start, end) {
            (Some(open), Some(close)) => pieces.extend(gap_piece(open.try_conjunction(&close))),
            (Some(open), None) => above = Some(open),
            (None, Some(close)) => below = Some(close),
            (None, None) => unreachable!("a non-empty range has at least one piece"),
        }

        let additional = match (below, above) {
            (Some(below), Some(above)) => {
                pieces.push(Subrange::new(below, above));
                None
            }
            (below, above) => below.or(above),
        };

        fixup(pieces, additional)
    }
}

fn gap_piece(result: CombineResult) -> Option<Subrange> {
    match result {
        CombineResult::Nothing => None,
        CombineResult::OneSubrange(subrange) => Some(subrange),
        other => unreachable!("gap between pieces produced {other:?}"),
    }
}

/// Bring arbitrary pieces into canonical form
fn fixup(mut subranges: Vec<Subrange>, mut additional: Option<VersionComparer>) -> VersionRange {
    if additional.as_ref().is_some_and(VersionComparer::is_exact) {
        if let Some(comparer) = additional.take() {
            subranges.push(Subrange::exact(comparer.version().clone()));
        }
    }

    // Pieces reaching the lowest or highest version are rays in disguise
    let mut rays: Vec<VersionComparer> = additional.take().into_iter().collect();
    subranges.retain(|subrange| match as_ray(subrange) {
        Some(ray) => {
            rays.push(ray);
            false
        }
        None => true,
    });
    for ray in rays {
        if is_empty_ray(&ray) {
            continue;
        }
        additional = match additional.take() {
            None => Some(ray),
            Some(current) => match current.try_disjunction(&ray) {
                CombineResult::OneComparer(comparer) => Some(comparer),
                CombineResult::OneSubrange(subrange) => {
                    subranges.push(subrange);
                    None
                }
                CombineResult::Everything => return collapsed(),
                other => unreachable!("ray union produced {other:?}"),
            },
        };
    }
    if additional.as_ref().is_some_and(is_full_ray) {
        return collapsed();
    }

    subranges.sort();

    let inward = subranges.split_off(subranges.partition_point(|s| !s.is_inward()));

    let mut outward: Option<Subrange> = None;
    for subrange in subranges {
        outward = match outward {
            None => Some(subrange),
            Some(current) => match current.try_disjunction(&subrange) {
                CombineResult::OneSubrange(merged) => Some(merged),
                CombineResult::Everything => return collapsed(),
                other => unreachable!("outward union produced {other:?}"),
            },
        };
    }

    let mut merged: Vec<Subrange> = Vec::with_capacity(inward.len());
    for subrange in inward {
        let Some(last) = merged.last_mut() else {
            merged.push(subrange);
            continue;
        };
        match last.try_disjunction(&subrange) {
            CombineResult::OneSubrange(union) => *last = union,
            CombineResult::TwoSubranges(..) => merged.push(subrange),
            other => unreachable!("inward union produced {other:?}"),
        }
    }

    if let (Some(current), Some(comparer)) = (&outward, &additional) {
        match current.check_combine_with_comparer(comparer) {
            CombineResult::OneSubrange(union) => {
                outward = Some(union);
                additional = None;
            }
            CombineResult::Everything => return collapsed(),
            other => unreachable!("outward subrange and ray produced {other:?}"),
        }
    }

    let mut kept = Vec::with_capacity(merged.len() + 1);
    for subrange in merged {
        if let Some(current) = &outward {
            match current.try_disjunction(&subrange) {
                CombineResult::OneSubrange(union) => outward = Some(union),
                CombineResult::TwoSubranges(..) => kept.push(subrange),
                CombineResult::Everything => return collapsed(),
                other => unreachable!("subrange union produced {other:?}"),
            }
        } else if let Some(comparer) = &additional {
            match subrange.check_combine_with_comparer(comparer) {
                CombineResult::OneComparer(ray) => additional = Some(ray),
                CombineResult::Unrepresentable => kept.push(subrange),
                other => unreachable!("subrange and ray produced {other:?}"),
            }
        } else {
            kept.push(subrange);
        }
    }

    if let Some(current) = outward {
        if current == Subrange::everything() {
            return collapsed();
        }
        kept.insert(0, current);
    }

    VersionRange::raw(kept, additional)
}

/// `<0.0.0-0` or `>MAX.MAX.MAX`
fn is_empty_ray(ray: &VersionComparer) -> bool {
    !ray.is_inclusive()
        && ((ray.is_downward() && ray.version().is_minimum()) || (ray.is_upward() && ray.version().is_maximum()))
}

/// `>=0.0.0-0` or `<=MAX.MAX.MAX`
fn is_full_ray(ray: &VersionComparer) -> bool {
    ray.is_inclusive()
        && ((ray.is_upward() && ray.version().is_minimum()) || (ray.is_downward() && ray.version().is_maximum()))
}

/// The single ray a subrange amounts to when one of its bounds is trivial
fn as_ray(subrange: &Subrange) -> Option<VersionComparer> {
    let (lower, upper) = (subrange.lower(), subrange.upper());
    let trivial: fn(&VersionComparer) -> bool = if subrange.is_inward() { is_full_ray } else { is_empty_ray };
    if trivial(lower) {
        Some(upper.clone())
    } else if trivial(upper) {
        Some(lower.clone())
    } else {
        None
    }
}

fn collapsed() -> VersionRange {
    log::trace!("Range normalization collapsed to everything");
    VersionRange::everything()
}

impl PartialEq for VersionRange {
    fn eq(&self, other: &Self) -> bool {
        self.subranges == other.subranges && self.additional == other.additional
    }
}

impl Eq for VersionRange {}

impl Hash for VersionRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.subranges.hash(state);
        self.additional.hash(state);
    }
}

impl fmt::Debug for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionRange")
            .field("subranges", &self.subranges)
            .field("additional", &self.additional)
            .finish()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            return write!(f, "Z");
        }
        if self.is_everything() {
            return write!(f, "*");
        }

        let mut parts: Vec<String> = self.subranges.iter().map(ToString::to_string).collect();
        if let Some(comparer) = &self.additional {
            parts.push(comparer.to_string());
        }
        write!(f, "{}", parts.join(" || "))
    }
}

impl FromStr for VersionRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionRange::parse(s)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        VersionRange::nothing()
    }
}

impl BitOr for &VersionRange {
    type Output = VersionRange;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.disjunction(rhs)
    }
}

impl BitAnd for &VersionRange {
    type Output = VersionRange;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.conjunction(rhs)
    }
}

impl Not for &VersionRange {
    type Output = VersionRange;

    fn not(self) -> Self::Output {
        self.invert()
    }
}
