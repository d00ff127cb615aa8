//! Recursive descent grammar for versions

use super::{ActionKind, Cursor, ParseContext};
use crate::Version;

pub(crate) fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Parse a version that must span the whole text
pub(crate) fn parse_complete_version(text: &str, ctx: &mut ParseContext) -> Option<Version> {
    let mut cursor = Cursor::new(text);
    let version = parse_version(&mut cursor, ctx)?;
    if !cursor.is_at_end() {
        ctx.expected(ActionKind::EndOfInput, cursor.pos(), text.len() - cursor.pos());
        return None;
    }
    Some(version)
}

/// Parse a version at the cursor
///
/// On failure the cursor is left where it started.
pub(crate) fn parse_version(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<Version> {
    let start = cursor.pos();
    match parse_version_parts(cursor, ctx) {
        Some(version) => {
            ctx.found(ActionKind::Version, start, cursor.pos() - start);
            Some(version)
        }
        None => {
            ctx.expected(ActionKind::Version, start, cursor.pos() - start);
            cursor.restore(start);
            None
        }
    }
}

fn parse_version_parts(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<Version> {
    let major = parse_numeric(cursor, ctx, ActionKind::Major)?;
    expect_dot(cursor, ctx, ActionKind::MajorDot)?;
    let minor = parse_numeric(cursor, ctx, ActionKind::Minor)?;
    expect_dot(cursor, ctx, ActionKind::MinorDot)?;
    let patch = parse_numeric(cursor, ctx, ActionKind::Patch)?;

    let mut prerelease = Vec::new();
    if cursor.eat(b'-') {
        prerelease = parse_identifiers(cursor, ctx, ActionKind::PrereleaseId)?;
    }

    let mut build = Vec::new();
    if cursor.eat(b'+') {
        build = parse_identifiers(cursor, ctx, ActionKind::BuildId)?;
    }

    Some(Version::from_parts(major, minor, patch, prerelease, build))
}

/// `"0" | [1-9][0-9]*`, fitting in a u64
pub(crate) fn parse_numeric(cursor: &mut Cursor<'_>, ctx: &mut ParseContext, kind: ActionKind) -> Option<u64> {
    let start = cursor.pos();
    let digits = cursor.take_while(|b| b.is_ascii_digit());

    if digits.is_empty() {
        ctx.expected(kind, start, 0);
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        ctx.expected(ActionKind::LeadingZero, start, digits.len());
        cursor.restore(start);
        return None;
    }

    match digits.parse::<u64>() {
        Ok(value) => {
            ctx.found(kind, start, digits.len());
            Some(value)
        }
        Err(_) => {
            ctx.expected(ActionKind::NumberTooLarge, start, digits.len());
            cursor.restore(start);
            None
        }
    }
}

fn expect_dot(cursor: &mut Cursor<'_>, ctx: &mut ParseContext, kind: ActionKind) -> Option<()> {
    let pos = cursor.pos();
    if cursor.eat(b'.') {
        ctx.found(kind, pos, 1);
        Some(())
    } else {
        ctx.expected(kind, pos, 0);
        None
    }
}

/// Dot separated identifiers after a `-` or `+`
fn parse_identifiers(cursor: &mut Cursor<'_>, ctx: &mut ParseContext, kind: ActionKind) -> Option<Vec<String>> {
    let mut identifiers = Vec::new();
    loop {
        let start = cursor.pos();
        let id = cursor.take_while(is_identifier_byte);

        if id.is_empty() {
            ctx.expected(kind, start, 0);
            return None;
        }
        let is_numeric = id.bytes().all(|b| b.is_ascii_digit());
        if kind == ActionKind::PrereleaseId && is_numeric && id.len() > 1 && id.starts_with('0') {
            ctx.expected(ActionKind::LeadingZero, start, id.len());
            cursor.restore(start);
            return None;
        }

        ctx.found(kind, start, id.len());
        identifiers.push(id.to_string());

        if !cursor.eat(b'.') {
            return Some(identifiers);
        }
    }
}
