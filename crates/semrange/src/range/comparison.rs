//! Comparison kinds for version comparers

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Flag set describing which side of a version a comparer accepts
///
/// `GREATER | EXACT_EQUAL` is `>=` and `LESS | EXACT_EQUAL` is `<=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ComparisonType(u8);

impl ComparisonType {
    pub const NONE: ComparisonType = ComparisonType(0);
    /// `=`
    pub const EXACT_EQUAL: ComparisonType = ComparisonType(1);
    /// `>`
    pub const GREATER: ComparisonType = ComparisonType(2);
    /// `<`
    pub const LESS: ComparisonType = ComparisonType(4);
    /// `~`, compare a release against its lowest prerelease
    pub const PRE_RELEASE: ComparisonType = ComparisonType(8);
    /// `>=`
    pub const GREATER_OR_EQUAL: ComparisonType = ComparisonType(1 | 2);
    /// `<=`
    pub const LESS_OR_EQUAL: ComparisonType = ComparisonType(1 | 4);

    const DIRECTIONS: ComparisonType = ComparisonType(1 | 2 | 4);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: ComparisonType) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn without(self, other: ComparisonType) -> ComparisonType {
        ComparisonType(self.0 & !other.0)
    }

    /// The kind accepting exactly the versions this one rejects
    ///
    /// Only meaningful for rays; `=` inverts to `<` or `>` which is not a
    /// single kind.
    pub fn inverted(self) -> ComparisonType {
        ComparisonType(self.0 ^ Self::DIRECTIONS.0)
    }

    /// Parse an operator as written in a range
    pub fn from_operator(s: &str) -> Option<Self> {
        let (modifier, op) = match s.strip_prefix('~') {
            Some(rest) => (Self::PRE_RELEASE, rest),
            None => (Self::NONE, s),
        };
        let kind = match op {
            "" | "=" => Self::EXACT_EQUAL,
            ">" => Self::GREATER,
            ">=" => Self::GREATER_OR_EQUAL,
            "<" => Self::LESS,
            "<=" => Self::LESS_OR_EQUAL,
            _ => return None,
        };
        if !modifier.is_empty() && kind == Self::EXACT_EQUAL {
            return None;
        }
        Some(kind | modifier)
    }

    /// Get the string representation of the operator
    pub fn as_str(self) -> &'static str {
        let directions = self.without(Self::PRE_RELEASE);
        let op = match directions {
            Self::EXACT_EQUAL => "=",
            Self::GREATER => ">",
            Self::GREATER_OR_EQUAL => ">=",
            Self::LESS => "<",
            Self::LESS_OR_EQUAL => "<=",
            _ => "?",
        };
        if self.contains(Self::PRE_RELEASE) {
            match op {
                ">" => "~>",
                ">=" => "~>=",
                "<" => "~<",
                "<=" => "~<=",
                other => other,
            }
        } else {
            op
        }
    }
}

impl BitOr for ComparisonType {
    type Output = ComparisonType;

    fn bitor(self, rhs: Self) -> Self::Output {
        ComparisonType(self.0 | rhs.0)
    }
}

impl BitOrAssign for ComparisonType {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ComparisonType {
    type Output = ComparisonType;

    fn bitand(self, rhs: Self) -> Self::Output {
        ComparisonType(self.0 & rhs.0)
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
