//! Serde support, enabled with the `serde` feature
//!
//! Both types serialize as their display string and deserialize through the
//! regular parsers, so the diagnostic report ends up in the error message.

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;

use crate::{Version, VersionRange};

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct VersionVisitor;

impl Visitor<'_> for VersionVisitor {
    type Value = Version;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a semantic version string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Version, E> {
        Version::parse(value).map_err(E::custom)
    }
}

struct RangeVisitor;

impl Visitor<'_> for RangeVisitor {
    type Value = VersionRange;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a version range string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<VersionRange, E> {
        VersionRange::parse(value).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(VersionVisitor)
    }
}

impl<'de> Deserialize<'de> for VersionRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(RangeVisitor)
    }
}
