//! Semver facade providing high-level string operations

use crate::{ParseError, Version, VersionRange};

/// String based helpers over [`Version`] and [`VersionRange`]
///
/// Inputs that do not parse never match and are left out of sorted output.
pub struct Semver;

impl Semver {
    /// Check if a version satisfies a range
    pub fn satisfies(version: &str, range: &str) -> bool {
        let Some(version) = Version::try_parse(version) else {
            return false;
        };
        let Some(range) = VersionRange::try_parse(range) else {
            return false;
        };
        range.matches(&version)
    }

    /// Return all versions that satisfy the given range, in input order
    pub fn satisfied_by(versions: &[&str], range: &str) -> Vec<String> {
        let Some(range) = VersionRange::try_parse(range) else {
            return Vec::new();
        };

        versions
            .iter()
            .filter(|v| Version::try_parse(v).is_some_and(|parsed| range.matches(&parsed)))
            .map(|v| v.to_string())
            .collect()
    }

    /// Parse a range once for repeated checks
    pub fn parse_range(range: &str) -> Result<VersionRange, ParseError> {
        VersionRange::parse(range)
    }

    /// Check a version against a pre-parsed range
    pub fn satisfies_parsed(version: &str, range: &VersionRange) -> bool {
        Version::try_parse(version).is_some_and(|v| range.matches(&v))
    }

    /// The highest version satisfying the range
    pub fn max_satisfying(versions: &[&str], range: &str) -> Option<String> {
        Self::matching(versions, range)
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, original)| original.to_string())
    }

    /// The lowest version satisfying the range
    pub fn min_satisfying(versions: &[&str], range: &str) -> Option<String> {
        Self::matching(versions, range)
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, original)| original.to_string())
    }

    fn matching<'a>(versions: &'a [&'a str], range: &str) -> impl Iterator<Item = (Version, &'a str)> + 'a {
        let range = VersionRange::try_parse(range);
        versions.iter().filter_map(move |v| {
            let parsed = Version::try_parse(v)?;
            range.as_ref()?.matches(&parsed).then_some((parsed, *v))
        })
    }

    /// Sort versions in ascending order
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Some((Version::try_parse(v)?, i)))
            .collect();

        // Stable, so equal versions keep their input order
        parsed.sort_by(|(a, _), (b, _)| {
            if ascending {
                a.cmp(b)
            } else {
                b.cmp(a)
            }
        });

        parsed
            .into_iter()
            .map(|(_, i)| versions[i].to_string())
            .collect()
    }
}
