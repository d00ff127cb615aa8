//! Version range algebra
//!
//! Ranges are built from three layers: a [`VersionComparer`] is a single
//! bound, a [`Subrange`] pairs two bounds into an interval or its complement,
//! and a [`VersionRange`] is a normalized union of subranges plus at most one
//! unbounded comparer.

mod combine;
mod comparer;
mod comparison;
mod subrange;
mod version_range;

pub use combine::CombineResult;
pub use comparer::VersionComparer;
pub use comparison::ComparisonType;
pub use subrange::Subrange;
pub use version_range::VersionRange;
