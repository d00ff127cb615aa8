//! Recursive descent parsers for versions and ranges

mod cursor;
mod range;
mod trace;
mod version;

pub(crate) use cursor::Cursor;
pub(crate) use range::parse_complete_range;
pub use trace::{ActionKind, ActionStatus, ParseAction, ParseContext};
pub(crate) use version::{parse_complete_version, parse_version};
