//! The SemVer version value type

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::diagnostics::{self, Grammar};
use crate::error::{ParseError, VersionError};
use crate::parser::{self, Cursor, ParseContext};

lazy_static! {
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[0-9A-Za-z-]+$").unwrap();
}

/// An immutable semantic version
///
/// Equality, hashing and ordering follow SemVer precedence: build metadata is
/// kept for display but never takes part in a comparison.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Vec<String>,
    build: Vec<String>,
}

impl Version {
    /// `0.0.0`
    pub const ZERO: Version = Version::new(0, 0, 0);

    /// Create a release version without identifiers
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build: Vec::new(),
        }
    }

    /// Create a version with prerelease and build identifiers, validating each
    pub fn with_identifiers<P, B>(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: P,
        build: B,
    ) -> Result<Self, VersionError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let prerelease: Vec<String> = prerelease.into_iter().map(Into::into).collect();
        let build: Vec<String> = build.into_iter().map(Into::into).collect();

        for id in prerelease.iter().chain(build.iter()) {
            if !IDENTIFIER_RE.is_match(id) {
                return Err(VersionError::InvalidIdentifier(id.clone()));
            }
        }
        if let Some(id) = prerelease.iter().find(|id| has_leading_zero(id)) {
            return Err(VersionError::LeadingZero(id.clone()));
        }

        Ok(Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        })
    }

    /// Build a version from identifiers the parser already validated
    pub(crate) fn from_parts(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: Vec<String>,
        build: Vec<String>,
    ) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease,
            build,
        }
    }

    /// Parse a version, producing a diagnostic report on failure
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        Self::try_parse(text).ok_or_else(|| {
            log::debug!("Could not parse version {:?}, building report", text);
            ParseError::InvalidVersion {
                input: text.to_string(),
                report: diagnostics::build_report(text, Grammar::Version),
            }
        })
    }

    /// Parse a version, returning `None` on failure
    pub fn try_parse(text: &str) -> Option<Self> {
        Self::try_parse_with(text, &mut ParseContext::silent())
    }

    /// Parse a version, recording parse actions into `context`
    pub fn try_parse_with(text: &str, context: &mut ParseContext) -> Option<Self> {
        parser::parse_complete_version(text.trim(), context)
    }

    /// Parse a version from the start of `text` and return it with the rest
    ///
    /// Nothing is consumed when no version can be read.
    pub fn parse_prefix(text: &str) -> Option<(Self, &str)> {
        let mut cursor = Cursor::new(text);
        let version = parser::parse_version(&mut cursor, &mut ParseContext::silent())?;
        Some((version, cursor.rest()))
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Prerelease identifiers in order
    pub fn prerelease(&self) -> &[String] {
        &self.prerelease
    }

    /// Build identifiers in order
    pub fn build(&self) -> &[String] {
        &self.build
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    /// The `major.minor.patch` part alone
    pub fn core(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }

    /// The lowest version sharing this version's core, `major.minor.patch-0`
    ///
    /// Versions that already carry prerelease identifiers are returned as is.
    pub fn prerelease_floor(&self) -> Version {
        if self.is_prerelease() {
            return self.clone();
        }
        Version::from_parts(self.major, self.minor, self.patch, vec!["0".to_string()], Vec::new())
    }

    /// `0.0.0-0`, the lowest version there is
    pub fn is_minimum(&self) -> bool {
        self.core() == Version::ZERO && self.prerelease.len() == 1 && self.prerelease[0] == "0"
    }

    /// The release with every number at `u64::MAX`, the highest version there is
    pub fn is_maximum(&self) -> bool {
        self.major == u64::MAX && self.minor == u64::MAX && self.patch == u64::MAX && !self.is_prerelease()
    }

    /// `(major + 1).0.0`, or `None` on overflow
    pub fn next_major(&self) -> Option<Version> {
        Some(Version::new(self.major.checked_add(1)?, 0, 0))
    }

    /// `major.(minor + 1).0`, or `None` on overflow
    pub fn next_minor(&self) -> Option<Version> {
        Some(Version::new(self.major, self.minor.checked_add(1)?, 0))
    }

    /// `major.minor.(patch + 1)`, or `None` on overflow
    pub fn next_patch(&self) -> Option<Version> {
        Some(Version::new(self.major, self.minor, self.patch.checked_add(1)?))
    }
}

fn has_leading_zero(id: &str) -> bool {
    id.len() > 1 && id.starts_with('0') && id.bytes().all(|b| b.is_ascii_digit())
}

fn is_numeric(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two prerelease identifiers
///
/// Numeric identifiers carry no leading zeros, so comparing their length
/// first and then their digits is a numeric comparison of any magnitude.
fn compare_identifiers(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        (true, true) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

fn compare_prerelease(a: &[String], b: &[String]) -> Ordering {
    // A release outranks any of its prereleases
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (x, y) in a.iter().zip(b.iter()) {
        match compare_identifiers(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(&self.prerelease, &other.prerelease))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.major == other.major
            && self.minor == other.minor
            && self.patch == other.patch
            && self.prerelease == other.prerelease
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::ZERO
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease.join("."))?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_parse_components() {
        let version = v("1.2.3-beta.11+build.01");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert_eq!(version.prerelease(), ["beta", "11"]);
        assert_eq!(version.build(), ["build", "01"]);
        assert!(version.is_prerelease());
    }

    #[test]
    fn test_round_trip() {
        for s in [
            "0.0.0",
            "1.2.3",
            "10.20.30",
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-0.3.7",
            "1.0.0-x.7.z.92",
            "1.0.0-x-y-z.--",
            "1.0.0+20130313144700",
            "1.0.0-beta+exp.sha.5114f85",
            "1.0.0+21AF26D3----117B344092BD",
            "18446744073709551615.0.0",
        ] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(v("  1.2.3\t"), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_fails() {
        for s in [
            "",
            "1",
            "1.2",
            "1.01.0",
            "01.0.0",
            "1.0.01",
            "1.0.0-01",
            "1.0.0-",
            "1.0.0+",
            "1.0.0-alpha..1",
            "1.0.0-alpha_1",
            "v1.0.0",
            "1.0.0 garbage",
            "18446744073709551616.0.0",
        ] {
            assert!(Version::try_parse(s).is_none(), "{s:?} should not parse");
        }
    }

    #[test]
    fn test_leading_zero_rules() {
        assert!(Version::try_parse("0.0.0").is_some());
        assert!(Version::try_parse("1.0.0+01").is_some());
        assert!(Version::try_parse("1.0.0-0").is_some());
        assert!(Version::try_parse("1.0.0-0a").is_some());
        assert!(Version::try_parse("1.0.0-01").is_none());
    }

    #[test]
    fn test_semver_precedence_chain() {
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];
        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_core_ordering() {
        assert!(v("1.0.0") < v("2.0.0"));
        assert!(v("2.0.0") < v("2.1.0"));
        assert!(v("2.1.0") < v("2.1.1"));
        assert!(v("1.9.9") < v("1.10.0"));
    }

    #[test]
    fn test_numeric_identifier_is_lesser() {
        assert!(v("1.0.0-1") < v("1.0.0-a"));
        assert!(v("1.0.0-999") < v("1.0.0--"));
        assert!(v("1.0.0-2") < v("1.0.0-10"));
        assert!(v("1.0.0-99999999999999999999") < v("1.0.0-100000000000000000000"));
    }

    #[test]
    fn test_build_metadata_is_ignored() {
        let a = v("1.0.0+a");
        let b = v("1.0.0+b");
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);

        use std::collections::hash_map::DefaultHasher;
        let hash = |x: &Version| {
            let mut h = DefaultHasher::new();
            x.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
        assert_eq!(a.to_string(), "1.0.0+a");
    }

    #[test]
    fn test_max_min() {
        let a = v("1.0.0-rc.1");
        let b = v("1.0.0");
        assert_eq!(a.clone().max(b.clone()), b);
        assert_eq!(a.clone().min(b), a);
    }

    #[test]
    fn test_with_identifiers() {
        let version = Version::with_identifiers(1, 0, 0, ["alpha", "1"], ["007"]).unwrap();
        assert_eq!(version.to_string(), "1.0.0-alpha.1+007");

        assert_eq!(
            Version::with_identifiers(1, 0, 0, ["01"], Vec::<String>::new()),
            Err(VersionError::LeadingZero("01".to_string()))
        );
        assert_eq!(
            Version::with_identifiers(1, 0, 0, ["be.ta"], Vec::<String>::new()),
            Err(VersionError::InvalidIdentifier("be.ta".to_string()))
        );
        assert_eq!(
            Version::with_identifiers(1, 0, 0, Vec::<String>::new(), [""]),
            Err(VersionError::InvalidIdentifier(String::new()))
        );
    }

    #[test]
    fn test_parse_prefix() {
        let (version, rest) = Version::parse_prefix("1.2.3-rc.1 || 2.0.0").unwrap();
        assert_eq!(version, v("1.2.3-rc.1"));
        assert_eq!(rest, " || 2.0.0");

        assert!(Version::parse_prefix("1.2 || 2.0.0").is_none());
    }

    #[test]
    fn test_helpers() {
        let version = v("1.2.3-beta+build");
        assert_eq!(version.core(), Version::new(1, 2, 3));
        assert_eq!(version.prerelease_floor(), version);
        assert_eq!(Version::new(2, 0, 0).prerelease_floor().to_string(), "2.0.0-0");
        assert_eq!(version.next_major(), Some(Version::new(2, 0, 0)));
        assert_eq!(version.next_minor(), Some(Version::new(1, 3, 0)));
        assert_eq!(version.next_patch(), Some(Version::new(1, 2, 4)));
        assert_eq!(Version::new(u64::MAX, 0, 0).next_major(), None);
        assert!(Version::new(2, 0, 0).prerelease_floor() < v("2.0.0-alpha"));
    }

    #[test]
    fn test_extremes() {
        let min = Version::ZERO.prerelease_floor();
        assert!(min.is_minimum());
        assert!(min < v("0.0.0-0.0"));
        assert!(!v("0.0.0-0.0").is_minimum());
        assert!(!Version::ZERO.is_minimum());

        let max = Version::new(u64::MAX, u64::MAX, u64::MAX);
        assert!(max.is_maximum());
        assert!(!v("18446744073709551615.18446744073709551615.18446744073709551615-rc").is_maximum());
        assert!(v("18446744073709551615.18446744073709551615.18446744073709551615+b").is_maximum());
    }

    #[test]
    fn test_from_str() {
        let version: Version = "3.1.4".parse().unwrap();
        assert_eq!(version, Version::new(3, 1, 4));
        assert!("3.1".parse::<Version>().is_err());
        assert_eq!(Version::default(), Version::ZERO);
    }
}
