//! Diagnostics for text that fails to parse
//!
//! A failed parse leaves a trace whose trailing `Expected` actions describe
//! the failure. The trace is matched against known mistakes; each one yields
//! a message and often a fix. A fix is spliced into the text, which is then
//! parsed again from scratch, so several independent mistakes are reported
//! at once and the final text becomes the suggestion.

use std::fmt;
use std::ops::Range;

use crate::parser::{self, ActionKind, ParseAction, ParseContext};
use crate::Version;

/// Fix rounds before giving up on a suggestion
const MAX_ROUNDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grammar {
    Version,
    Range,
}

impl Grammar {
    fn accepts(self, text: &str, ctx: &mut ParseContext) -> bool {
        match self {
            Grammar::Version => parser::parse_complete_version(text, ctx).is_some(),
            Grammar::Range => parser::parse_complete_range(text, ctx).is_some(),
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Grammar::Version => "version",
            Grammar::Range => "version range",
        }
    }
}

/// One problem found in the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    span: Range<usize>,
    text: String,
}

impl Message {
    /// Byte range in [`Report::line`] the message points at
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Everything known about why an input failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    input: String,
    line: String,
    suggestion: Option<String>,
    messages: Vec<Message>,
}

impl Report {
    /// The text that failed to parse
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The text the message spans refer to, with every fix applied
    pub fn line(&self) -> &str {
        &self.line
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// A corrected input that parses, if one was found
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Render the line, the underlined messages and the suggestion
    pub fn render(&self) -> String {
        let mut out = self.line.clone();
        for row in partition_rows(&self.line, &self.messages) {
            out.push('\n');
            out.push_str(&render_row(&row));
        }
        if let Some(suggestion) = &self.suggestion {
            out.push_str("\nSuggestion: ");
            out.push_str(suggestion);
        }
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A replacement of `range` by `replacement`
#[derive(Debug)]
struct Fix {
    range: Range<usize>,
    replacement: String,
}

impl Fix {
    fn insert(at: usize, text: &str) -> Self {
        Fix {
            range: at..at,
            replacement: text.to_string(),
        }
    }

    fn remove(range: Range<usize>) -> Self {
        Fix {
            range,
            replacement: String::new(),
        }
    }

    fn replace(range: Range<usize>, text: &str) -> Self {
        Fix {
            range,
            replacement: text.to_string(),
        }
    }

    fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.replacement.len());
        out.push_str(&text[..self.range.start]);
        out.push_str(&self.replacement);
        out.push_str(&text[self.range.end..]);
        out
    }

    /// Where a position in the old text ends up in the fixed text
    fn map(&self, pos: usize) -> usize {
        if pos <= self.range.start {
            pos
        } else if pos >= self.range.end {
            pos - self.range.end + self.range.start + self.replacement.len()
        } else {
            self.range.start + self.replacement.len()
        }
    }
}

/// A recognized mistake
#[derive(Debug)]
struct Finding {
    message: String,
    span: Range<usize>,
    fix: Option<Fix>,
}

impl Finding {
    fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Finding {
            message: message.into(),
            span,
            fix: None,
        }
    }

    fn fixed(message: impl Into<String>, fix: Fix) -> Self {
        Finding {
            message: message.into(),
            span: fix.range.clone(),
            fix: Some(fix),
        }
    }
}

/// Diagnose `input`, which is known not to parse with `grammar`
pub(crate) fn build_report(input: &str, grammar: Grammar) -> Report {
    let mut line = input.to_string();
    let mut messages: Vec<Message> = Vec::new();
    let mut accepted = false;
    let mut fixed = false;

    for round in 0..MAX_ROUNDS {
        let mut ctx = ParseContext::collecting();
        if grammar.accepts(&line, &mut ctx) {
            accepted = true;
            break;
        }

        let finding = classify(&line, &ctx, grammar);
        let fix = finding.fix.filter(|fix| fix.apply(&line) != line);
        let Some(fix) = fix else {
            messages.push(Message {
                span: finding.span,
                text: finding.message,
            });
            break;
        };

        for message in &mut messages {
            message.span = fix.map(message.span.start)..fix.map(message.span.end);
        }
        let start = fix.range.start;
        messages.push(Message {
            span: start..start + fix.replacement.len(),
            text: finding.message,
        });
        line = fix.apply(&line);
        fixed = true;
        log::trace!("Diagnostic round {}: trying {:?}", round, line);
    }

    Report {
        input: input.to_string(),
        suggestion: (accepted && fixed).then(|| line.clone()),
        line,
        messages,
    }
}

fn classify(text: &str, ctx: &ParseContext, grammar: Grammar) -> Finding {
    let run = ctx.trailing_expected();
    let Some(first) = run.first() else {
        return Finding::new(format!("invalid {}", grammar.noun()), 0..text.len());
    };
    let kinds: Vec<ActionKind> = run.iter().map(|a| a.kind).collect();

    match kinds.as_slice() {
        [ActionKind::EndOfInput] => trailing_input(text, ctx, first),
        [ActionKind::RangeOrder] => unordered_bounds(text, ctx, first),
        [ActionKind::ClosingBound] => same_direction_bounds(text, ctx, first),
        [ActionKind::ExactBound] => Finding::new(
            "an exact version cannot be combined with another bound",
            span_of(first),
        ),
        [ActionKind::OrSeparator] => Finding::fixed(
            "expected `||` between versions",
            Fix::insert(first.offset, "|| "),
        ),
        [ActionKind::PrereleaseModifier] => Finding::fixed(
            "`~` only applies to `<`, `<=`, `>` and `>=`",
            Fix::remove(first.offset..first.offset + 1),
        ),
        [_, ActionKind::Version, ..] => version_mistake(text, first, grammar),
        _ => Finding::new(format!("invalid {}", grammar.noun()), span_of(first)),
    }
}

fn span_of(action: &ParseAction) -> Range<usize> {
    action.offset..action.end()
}

fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|rest| rest.chars().next())
}

/// Whether a component could end before `c`
fn ends_component(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || c == '|',
    }
}

/// A separator that was probably meant to be something else
fn stray_separator(text: &str, pos: usize) -> Option<char> {
    let c = char_at(text, pos)?;
    let next = char_at(text, pos + c.len_utf8())?;
    (c.is_ascii_punctuation() && c != '|' && next.is_ascii_alphanumeric()).then_some(c)
}

fn last_found(ctx: &ParseContext, pred: impl Fn(ActionKind) -> bool) -> Option<&ParseAction> {
    ctx.actions()
        .iter()
        .rev()
        .find(|a| !a.is_expected() && pred(a.kind))
}

/// A failure inside a version, described by its innermost action
fn version_mistake(text: &str, inner: &ParseAction, grammar: Grammar) -> Finding {
    let pos = inner.offset;
    let next = char_at(text, pos);

    match inner.kind {
        ActionKind::MajorDot | ActionKind::MinorDot => {
            let (missing, filler) = if inner.kind == ActionKind::MajorDot {
                ("missing minor and patch numbers", ".0.0")
            } else {
                ("missing patch number", ".0")
            };
            if ends_component(next) {
                Finding::fixed(missing, Fix::insert(pos, filler))
            } else if let Some(c) = stray_separator(text, pos).filter(|_| {
                char_at(text, pos + 1).is_some_and(|d| d.is_ascii_digit())
            }) {
                Finding::fixed(
                    format!("expected `.` instead of `{c}`"),
                    Fix::replace(pos..pos + c.len_utf8(), "."),
                )
            } else {
                Finding::new("expected `.`", pos..pos)
            }
        }
        ActionKind::Minor | ActionKind::Patch => {
            let which = if inner.kind == ActionKind::Minor { "minor" } else { "patch" };
            if matches!(next, Some('x' | 'X' | '*')) {
                misplaced_wildcard(text, pos, grammar)
            } else if ends_component(next) || matches!(next, Some('.' | '-' | '+')) {
                Finding::fixed(format!("missing {which} number"), Fix::insert(pos, "0"))
            } else {
                Finding::new(format!("expected {which} number"), pos..pos)
            }
        }
        ActionKind::Major => {
            if text.trim().is_empty() {
                Finding::new("expected a version, found nothing", pos..pos)
            } else if matches!(next, Some('v' | 'V'))
                && char_at(text, pos + 1).is_some_and(|d| d.is_ascii_digit())
            {
                Finding::fixed("versions do not take a `v` prefix", Fix::remove(pos..pos + 1))
            } else {
                Finding::new("expected a version", pos..pos)
            }
        }
        ActionKind::LeadingZero => {
            let digits = &text[span_of(inner)];
            let trimmed = digits.trim_start_matches('0');
            let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
            Finding::fixed("numbers must not have leading zeros", Fix::replace(span_of(inner), trimmed))
        }
        ActionKind::NumberTooLarge => Finding::new("number does not fit in 64 bits", span_of(inner)),
        ActionKind::PrereleaseId | ActionKind::BuildId => {
            let what = if inner.kind == ActionKind::PrereleaseId {
                "empty prerelease identifier"
            } else {
                "empty build identifier"
            };
            if ends_component(next) && pos > 0 {
                Finding::fixed(what, Fix::remove(pos - 1..pos))
            } else if next == Some('.') {
                Finding::fixed(what, Fix::remove(pos..pos + 1))
            } else {
                Finding::new("identifiers may only contain [0-9A-Za-z-]", pos..pos)
            }
        }
        _ => Finding::new("invalid version", pos..pos),
    }
}

/// A wildcard where a number was expected
///
/// Star ranges end at their wildcard, so anything after it up to the end of
/// the component is removed.
fn misplaced_wildcard(text: &str, pos: usize, grammar: Grammar) -> Finding {
    let after = pos + 1;
    let end = component_end(text, after);
    match grammar {
        Grammar::Version => Finding::new("wildcards are only allowed in ranges", pos..after),
        Grammar::Range if end > after => {
            Finding::fixed("nothing may follow a wildcard", Fix::remove(after..end))
        }
        Grammar::Range => Finding::new(
            "wildcards are only allowed in `M.*` and `M.m.*` ranges",
            pos..after,
        ),
    }
}

/// Where the component containing `pos` ends
fn component_end(text: &str, pos: usize) -> usize {
    text[pos..]
        .find(|c: char| c.is_whitespace() || c == '|')
        .map_or(text.len(), |i| pos + i)
}

/// Input left over after a complete version or range
fn trailing_input(text: &str, ctx: &ParseContext, action: &ParseAction) -> Finding {
    let pos = action.offset;
    let previous = last_found(ctx, |kind| kind != ActionKind::Version);
    let adjacent = previous.is_some_and(|p| p.end() == pos);

    if let (Some(c), true) = (stray_separator(text, pos), adjacent) {
        let range = pos..pos + c.len_utf8();
        match previous.map(|p| p.kind) {
            Some(ActionKind::Patch) if c == '.' => {
                let end = text[pos..]
                    .find(|c: char| c != '.' && !c.is_ascii_digit())
                    .map_or(text.len(), |i| pos + i);
                let next = char_at(text, end);
                if ends_component(next) || matches!(next, Some('-' | '+')) {
                    return Finding::fixed(
                        "unexpected fourth version component",
                        Fix::remove(pos..end),
                    );
                }
                return Finding::fixed(
                    "expected `-` before prerelease identifiers, found `.`",
                    Fix::replace(range, "-"),
                );
            }
            Some(ActionKind::Patch) => {
                return Finding::fixed(
                    format!("expected `-` before prerelease identifiers, found `{c}`"),
                    Fix::replace(range, "-"),
                )
            }
            Some(ActionKind::PrereleaseId | ActionKind::BuildId) => {
                return Finding::fixed(
                    format!("expected `.` between identifiers, found `{c}`"),
                    Fix::replace(range, "."),
                )
            }
            _ => {}
        }
    }

    let rest = &text[pos..];
    if rest.starts_with('|') && !rest.starts_with("||") && !rest[1..].trim().is_empty() {
        return Finding::fixed("expected `||`", Fix::replace(pos..pos + 1, "||"));
    }

    let start = text[..pos].trim_end().len();
    Finding::fixed("unexpected trailing input", Fix::remove(start..text.len()))
}

/// Two bounds that enclose no version
fn unordered_bounds(text: &str, ctx: &ParseContext, action: &ParseAction) -> Finding {
    let mut versions = ctx
        .actions()
        .iter()
        .rev()
        .filter(|a| !a.is_expected() && a.kind == ActionKind::Version);

    if let (Some(second), Some(first)) = (versions.next(), versions.next()) {
        let a = &text[span_of(first)];
        let b = &text[span_of(second)];
        let differ = match (Version::try_parse(a), Version::try_parse(b)) {
            (Some(x), Some(y)) => x != y,
            _ => false,
        };
        if differ {
            let swapped = format!("{}{}{}", b, &text[first.end()..second.offset], a);
            return Finding::fixed(
                "range bounds are in the wrong order",
                Fix::replace(first.offset..second.end(), &swapped),
            );
        }
    }

    Finding::new("range bounds do not enclose any version", span_of(action))
}

/// Two bounds facing the same way
fn same_direction_bounds(text: &str, ctx: &ParseContext, action: &ParseAction) -> Finding {
    let message = "both bounds face the same way";
    let Some(op) = last_found(ctx, |kind| kind == ActionKind::Operator) else {
        return Finding::new(message, span_of(action));
    };

    let written = &text[span_of(op)];
    let flipped: String = written
        .chars()
        .map(|c| match c {
            '>' => '<',
            '<' => '>',
            c => c,
        })
        .collect();
    Finding::fixed(message, Fix::replace(span_of(op), &flipped))
}

/// A message placed on a display row, in character columns
struct Placed<'a> {
    column: usize,
    width: usize,
    text: &'a str,
}

/// Spread messages over rows so that no two underlines on a row overlap
fn partition_rows<'a>(line: &str, messages: &'a [Message]) -> Vec<Vec<Placed<'a>>> {
    let columns = |pos: usize| line.get(..pos).map_or(pos, |s| s.chars().count());

    let mut placed: Vec<Placed<'a>> = messages
        .iter()
        .map(|m| {
            let column = columns(m.span.start);
            let width = columns(m.span.end).saturating_sub(column).max(1);
            Placed {
                column,
                width,
                text: &m.text,
            }
        })
        .collect();
    placed.sort_by_key(|p| (p.column, p.width));

    let mut rows: Vec<Vec<Placed<'a>>> = Vec::new();
    for p in placed {
        let free = rows.iter_mut().find(|row| {
            row.last()
                .is_some_and(|last| last.column + last.width < p.column)
        });
        match free {
            Some(row) => row.push(p),
            None => rows.push(vec![p]),
        }
    }
    rows
}

fn pad_to(out: &mut String, column: usize) {
    let len = out.chars().count();
    if len < column {
        out.extend(std::iter::repeat(' ').take(column - len));
    }
}

/// Underlines for one row, labelled right to left
fn render_row(row: &[Placed<'_>]) -> String {
    let mut markers = String::new();
    for p in row {
        pad_to(&mut markers, p.column);
        markers.push('^');
        markers.extend(std::iter::repeat('~').take(p.width - 1));
    }

    let mut lines = Vec::with_capacity(row.len());
    if let Some(last) = row.last() {
        markers.push(' ');
        markers.push_str(last.text);
    }
    lines.push(markers);

    for i in (0..row.len().saturating_sub(1)).rev() {
        let mut label = String::new();
        for p in &row[..i] {
            pad_to(&mut label, p.column);
            label.push('|');
        }
        pad_to(&mut label, row[i].column);
        label.push_str(row[i].text);
        lines.push(label);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(text: &str) -> Report {
        build_report(text, Grammar::Version)
    }

    fn range(text: &str) -> Report {
        build_report(text, Grammar::Range)
    }

    fn texts(report: &Report) -> Vec<&str> {
        report.messages().iter().map(Message::text).collect()
    }

    #[test]
    fn test_missing_patch() {
        let report = version("1.2");
        assert_eq!(report.suggestion(), Some("1.2.0"));
        assert_eq!(texts(&report), vec!["missing patch number"]);
        assert_eq!(report.messages()[0].span(), 3..5);
        assert_eq!(report.render(), "1.2.0\n   ^~ missing patch number\nSuggestion: 1.2.0");
    }

    #[test]
    fn test_missing_minor_and_patch() {
        assert_eq!(version("1").suggestion(), Some("1.0.0"));
        assert_eq!(range(">=2").suggestion(), Some(">=2.0.0"));
    }

    #[test]
    fn test_missing_numbers_after_dot() {
        assert_eq!(version("1.2.").suggestion(), Some("1.2.0"));
        assert_eq!(version("1..3").suggestion(), Some("1.0.3"));
    }

    #[test]
    fn test_wrong_separator_in_core() {
        let report = version("1,2.3");
        assert_eq!(report.suggestion(), Some("1.2.3"));
        assert_eq!(texts(&report), vec!["expected `.` instead of `,`"]);
    }

    #[test]
    fn test_leading_zeros() {
        let report = version("01.002.0");
        assert_eq!(report.suggestion(), Some("1.2.0"));
        assert_eq!(report.messages().len(), 2);
        assert_eq!(version("1.0.0-alpha.00").suggestion(), Some("1.0.0-alpha.0"));
    }

    #[test]
    fn test_prerelease_delimiters() {
        assert_eq!(version("1.0.0_beta").suggestion(), Some("1.0.0-beta"));
        assert_eq!(version("1.0.0-alpha_1").suggestion(), Some("1.0.0-alpha.1"));
        assert_eq!(version("1.0.0-alpha..1").suggestion(), Some("1.0.0-alpha.1"));
        assert_eq!(version("1.0.0-").suggestion(), Some("1.0.0"));
        assert_eq!(version("1.0.0+build.").suggestion(), Some("1.0.0+build"));
    }

    #[test]
    fn test_v_prefix() {
        assert_eq!(version("v1.2.3").suggestion(), Some("1.2.3"));
    }

    #[test]
    fn test_trailing_input() {
        let report = version("1.0.0 garbage");
        assert_eq!(report.suggestion(), Some("1.0.0"));
        assert_eq!(texts(&report), vec!["unexpected trailing input"]);
    }

    #[test]
    fn test_fourth_component() {
        let report = version("1.2.3.4");
        assert_eq!(report.suggestion(), Some("1.2.3"));
        assert_eq!(texts(&report), vec!["unexpected fourth version component"]);
        assert_eq!(report.messages()[0].span(), 5..5);

        assert_eq!(version("1.2.3.4-beta").suggestion(), Some("1.2.3-beta"));
        assert_eq!(version("1.2.3.4.5").suggestion(), Some("1.2.3"));
        assert_eq!(range(">=1.2.3.4 <2.0.0").suggestion(), Some(">=1.2.3 <2.0.0"));

        // Anything else after a dot is still read as a prerelease
        assert_eq!(version("1.2.3.beta").suggestion(), Some("1.2.3-beta"));
        assert_eq!(version("1.2.3.4a").suggestion(), Some("1.2.3-4a"));
    }

    #[test]
    fn test_misplaced_wildcard() {
        let report = range("1.x.x");
        assert_eq!(report.suggestion(), Some("1.x"));
        assert_eq!(texts(&report), vec!["nothing may follow a wildcard"]);

        assert_eq!(range("1.2.x.x").suggestion(), Some("1.2.x"));
        assert_eq!(range("1.*.3 || 2.0.0").suggestion(), Some("1.* || 2.0.0"));

        let report = range(">=1.x");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["wildcards are only allowed in `M.*` and `M.m.*` ranges"]);

        let report = version("1.x.x");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["wildcards are only allowed in ranges"]);
        assert_eq!(report.messages()[0].span(), 2..3);
    }

    #[test]
    fn test_nothing_to_suggest() {
        let report = version("");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["expected a version, found nothing"]);

        let report = version("1.99999999999999999999.0");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["number does not fit in 64 bits"]);
        assert_eq!(report.messages()[0].span(), 2..22);
    }

    #[test]
    fn test_range_shapes() {
        assert_eq!(range("2.0.0 - 1.0.0").suggestion(), Some("1.0.0 - 2.0.0"));
        assert_eq!(range(">=2.0.0 <1.0.0").suggestion(), Some(">=1.0.0 <2.0.0"));
        assert_eq!(range(">=1.0.0 >2.0.0").suggestion(), Some(">=1.0.0 <2.0.0"));
        assert_eq!(range("1.0.0 2.0.0").suggestion(), Some("1.0.0 || 2.0.0"));
        assert_eq!(range("1.0.0 | 2.0.0").suggestion(), Some("1.0.0 || 2.0.0"));
        assert_eq!(range("~1.0.0").suggestion(), Some("1.0.0"));
    }

    #[test]
    fn test_unfixable_range_shapes() {
        let report = range(">=1.0.0 2.0.0");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["an exact version cannot be combined with another bound"]);

        let report = range(">1.0.0 <1.0.0");
        assert_eq!(report.suggestion(), None);
        assert_eq!(texts(&report), vec!["range bounds do not enclose any version"]);
    }

    #[test]
    fn test_several_mistakes_are_stacked() {
        let report = range(">=1.2 <2");
        assert_eq!(report.suggestion(), Some(">=1.2.0 <2.0.0"));
        assert_eq!(report.messages()[0].span(), 5..7);
        assert_eq!(report.messages()[1].span(), 10..14);
        assert_eq!(
            report.render(),
            ">=1.2.0 <2.0.0\n     ^~   ^~~~ missing minor and patch numbers\n     missing patch number\nSuggestion: >=1.2.0 <2.0.0"
        );
    }

    #[test]
    fn test_overlapping_spans_use_separate_rows() {
        let messages = vec![
            Message {
                span: 0..4,
                text: "outer".to_string(),
            },
            Message {
                span: 2..3,
                text: "inner".to_string(),
            },
        ];
        let rows = partition_rows("abcdef", &messages);
        assert_eq!(rows.len(), 2);
        assert_eq!(render_row(&rows[0]), "^~~~ outer");
        assert_eq!(render_row(&rows[1]), "  ^ inner");
    }

    #[test]
    fn test_earlier_spans_shift() {
        let fix = Fix::insert(2, "xyz");
        assert_eq!(fix.map(1), 1);
        assert_eq!(fix.map(2), 2);
        assert_eq!(fix.map(4), 7);
        let fix = Fix::remove(2..5);
        assert_eq!(fix.map(3), 2);
        assert_eq!(fix.map(6), 3);
    }
}
