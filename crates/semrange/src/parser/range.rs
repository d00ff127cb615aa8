//! Recursive descent grammar for ranges
//!
//! ```text
//! range      := component ("||" component)*
//! component  := star-range | hyphen-range | caret-range | comparer [comparer] | "*" | "z" | "Z"
//! star-range := numid "." ("*"|"x"|"X") | numid "." numid "." ("*"|"x"|"X")
//! hyphen     := version " - " version
//! caret      := "^" version
//! comparer   := ["~"] (">"|"<")? "="? version
//! ```

use super::version::{parse_numeric, parse_version};
use super::{ActionKind, Cursor, ParseContext};
use crate::range::{CombineResult, ComparisonType, Subrange, VersionComparer, VersionRange};
use crate::Version;

/// Parse a range that must span the whole text
pub(crate) fn parse_complete_range(text: &str, ctx: &mut ParseContext) -> Option<VersionRange> {
    let mut cursor = Cursor::new(text);
    let range = parse_range(&mut cursor, ctx)?;
    cursor.skip_whitespace();
    if !cursor.is_at_end() {
        ctx.expected(ActionKind::EndOfInput, cursor.pos(), text.len() - cursor.pos());
        return None;
    }
    Some(range)
}

/// Parse `component ("||" component)*`
pub(crate) fn parse_range(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionRange> {
    let start = cursor.pos();
    let Some(mut range) = parse_component(cursor, ctx) else {
        cursor.restore(start);
        return None;
    };

    loop {
        let saved = cursor.pos();
        cursor.skip_whitespace();
        let separator = cursor.pos();
        if !cursor.eat_str("||") {
            cursor.restore(saved);
            return Some(range);
        }
        ctx.found(ActionKind::OrSeparator, separator, 2);
        cursor.skip_whitespace();

        let Some(next) = parse_component(cursor, ctx) else {
            cursor.restore(start);
            return None;
        };
        range = range.disjunction(&next);
    }
}

fn parse_component(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionRange> {
    let start = cursor.pos();
    match cursor.peek() {
        Some(b'*') => {
            cursor.bump();
            ctx.found(ActionKind::Star, start, 1);
            Some(VersionRange::everything())
        }
        Some(b'z' | b'Z') => {
            cursor.bump();
            ctx.found(ActionKind::Empty, start, 1);
            Some(VersionRange::nothing())
        }
        Some(b'^') => parse_caret(cursor, ctx),
        Some(b'~' | b'>' | b'<' | b'=') => {
            let first = parse_comparer(cursor, ctx)?;
            parse_second_comparer(cursor, ctx, first, start)
        }
        _ => match parse_star_range(cursor, ctx) {
            Some(range) => Some(range),
            None => parse_version_component(cursor, ctx),
        },
    }
}

/// Whether a component may end at the cursor
fn at_component_end(cursor: &Cursor<'_>) -> bool {
    match cursor.peek() {
        None => true,
        Some(b) => b.is_ascii_whitespace() || b == b'|',
    }
}

fn eat_wildcard(cursor: &mut Cursor<'_>) -> bool {
    cursor.eat(b'*') || cursor.eat(b'x') || cursor.eat(b'X')
}

/// `M.*` or `M.m.*`, read as a lookahead that records nothing unless it matches
fn parse_star_range(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionRange> {
    let start = cursor.pos();
    let mut probe = *cursor;
    let silent = &mut ParseContext::silent();

    let major = parse_numeric(&mut probe, silent, ActionKind::Major)?;
    if !probe.eat(b'.') {
        return None;
    }

    let (lower, upper) = if eat_wildcard(&mut probe) {
        let lower = Version::new(major, 0, 0);
        let upper = lower.next_major().map(VersionComparer::less);
        (lower, upper)
    } else {
        let minor = parse_numeric(&mut probe, silent, ActionKind::Minor)?;
        if !(probe.eat(b'.') && eat_wildcard(&mut probe)) {
            return None;
        }
        let lower = Version::new(major, minor, 0);
        let upper = ceiling(lower.next_minor(), Version::new(major, minor, u64::MAX));
        (lower, Some(upper))
    };

    if !at_component_end(&probe) {
        return None;
    }

    ctx.found(ActionKind::Star, start, probe.pos() - start);
    *cursor = probe;
    Some(bounded_from(lower, upper))
}

/// `>=lower` closed by `upper`, or `>=lower` alone when the major overflowed
fn bounded_from(lower: Version, upper: Option<VersionComparer>) -> VersionRange {
    let lower = VersionComparer::greater_or_equal(lower);
    match upper {
        Some(upper) => VersionRange::from_subrange(Subrange::new(lower, upper)),
        None => VersionRange::from_comparer(lower),
    }
}

/// `<next`, or `<=last` when `next` overflows
///
/// `last` is the highest version below the overflowed `next`, so both
/// bounds admit the same versions.
fn ceiling(next: Option<Version>, last: Version) -> VersionComparer {
    match next {
        Some(next) => VersionComparer::less(next),
        None => VersionComparer::less_or_equal(last),
    }
}

fn parse_caret(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionRange> {
    let start = cursor.pos();
    cursor.bump();
    ctx.found(ActionKind::Caret, start, 1);

    let version = parse_version(cursor, ctx)?;
    let upper = if version.major() > 0 {
        version.next_major().map(VersionComparer::less)
    } else if version.minor() > 0 {
        Some(ceiling(version.next_minor(), Version::new(0, version.minor(), u64::MAX)))
    } else {
        Some(ceiling(version.next_patch(), Version::new(0, 0, u64::MAX)))
    };
    Some(bounded_from(version, upper))
}

/// A bare version, which is either a hyphen range or an exact comparer
fn parse_version_component(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionRange> {
    let start = cursor.pos();
    let lower = parse_version(cursor, ctx)?;

    let after = cursor.pos();
    let mut probe = *cursor;
    let is_hyphen = probe.skip_whitespace() > 0
        && probe.eat(b'-')
        && (probe.is_at_end() || probe.skip_whitespace() > 0);
    if !is_hyphen {
        return parse_second_comparer(cursor, ctx, VersionComparer::exact(lower), start);
    }

    ctx.found(ActionKind::HyphenRange, after, probe.pos() - after);
    *cursor = probe;
    let upper = parse_version(cursor, ctx)?;

    let lower = VersionComparer::greater_or_equal(lower);
    let upper = VersionComparer::less_or_equal(upper);
    match lower.try_conjunction(&upper) {
        CombineResult::OneSubrange(subrange) => Some(VersionRange::from_subrange(subrange)),
        _ => {
            ctx.expected(ActionKind::RangeOrder, start, cursor.pos() - start);
            None
        }
    }
}

/// `["~"] (">"|"<")? "="? version`
fn parse_comparer(cursor: &mut Cursor<'_>, ctx: &mut ParseContext) -> Option<VersionComparer> {
    let start = cursor.pos();
    let modifier = cursor.eat(b'~');

    let op_start = cursor.pos();
    let mut kind = if cursor.eat(b'>') {
        ComparisonType::GREATER
    } else if cursor.eat(b'<') {
        ComparisonType::LESS
    } else {
        ComparisonType::NONE
    };
    if cursor.eat(b'=') {
        kind |= ComparisonType::EXACT_EQUAL;
    }

    if kind.is_empty() {
        kind = ComparisonType::EXACT_EQUAL;
    } else {
        ctx.found(ActionKind::Operator, op_start, cursor.pos() - op_start);
        cursor.skip_whitespace();
    }

    if modifier {
        if kind == ComparisonType::EXACT_EQUAL {
            ctx.expected(ActionKind::PrereleaseModifier, start, 1);
            return None;
        }
        kind |= ComparisonType::PRE_RELEASE;
    }

    let version = parse_version(cursor, ctx)?;
    Some(VersionComparer::new(version, kind))
}

/// An optional second comparer closing the range opened by `first`
fn parse_second_comparer(
    cursor: &mut Cursor<'_>,
    ctx: &mut ParseContext,
    first: VersionComparer,
    start: usize,
) -> Option<VersionRange> {
    let mut probe = *cursor;
    let follows = probe.skip_whitespace() > 0
        && matches!(probe.peek(), Some(b'~' | b'>' | b'<' | b'=' | b'0'..=b'9'));
    if !follows {
        return Some(VersionRange::from_comparer(first));
    }

    *cursor = probe;
    let second_start = cursor.pos();
    let second = parse_comparer(cursor, ctx)?;
    let second_len = cursor.pos() - second_start;

    if first.is_exact() && second.is_exact() {
        ctx.expected(ActionKind::OrSeparator, second_start, 0);
        return None;
    }
    if first.is_exact() || second.is_exact() {
        ctx.expected(ActionKind::ExactBound, start, cursor.pos() - start);
        return None;
    }
    if first.is_upward() == second.is_upward() {
        ctx.expected(ActionKind::ClosingBound, second_start, second_len);
        return None;
    }

    match first.try_conjunction(&second) {
        CombineResult::OneSubrange(subrange) => Some(VersionRange::from_subrange(subrange)),
        _ => {
            ctx.expected(ActionKind::RangeOrder, start, cursor.pos() - start);
            None
        }
    }
}
