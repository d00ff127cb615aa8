//! Semantic versions and a version-range algebra
//!
//! This crate provides SemVer 2.0.0 version parsing and ordering, range
//! expressions (`^1.2.3`, `1.0.0 - 2.0.0`, `>=1.0.0 <2.0.0 || 3.x`) and an
//! algebra that combines ranges into a canonical set of intervals. Parse
//! failures come with diagnostics that point at the problem and suggest a
//! corrected input.

pub mod diagnostics;
mod error;
mod parser;
pub mod range;
mod semver;
#[cfg(feature = "serde")]
mod serde_impl;
mod version;

pub use diagnostics::{Message, Report};
pub use error::{ParseError, VersionError};
pub use parser::{ActionKind, ActionStatus, ParseAction, ParseContext};
pub use range::{CombineResult, ComparisonType, Subrange, VersionComparer, VersionRange};
pub use semver::Semver;
pub use version::Version;
