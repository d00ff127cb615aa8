//! Error types for versions and ranges

use thiserror::Error;

use crate::diagnostics::Report;

/// Error returned by the throwing parse functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid version string \"{input}\"\n{report}")]
    InvalidVersion { input: String, report: Report },
    #[error("Invalid version range \"{input}\"\n{report}")]
    InvalidRange { input: String, report: Report },
}

impl ParseError {
    /// The (trimmed) text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            ParseError::InvalidVersion { input, .. } | ParseError::InvalidRange { input, .. } => input,
        }
    }

    /// The diagnostic report built for the input
    pub fn report(&self) -> &Report {
        match self {
            ParseError::InvalidVersion { report, .. } | ParseError::InvalidRange { report, .. } => report,
        }
    }
}

/// Error type for building a version from its components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid identifier \"{0}\", identifiers may only contain [0-9A-Za-z-]")]
    InvalidIdentifier(String),
    #[error("Numeric prerelease identifier \"{0}\" must not have leading zeros")]
    LeadingZero(String),
}
